//! Single-process sorted-set substrate.
//!
//! One mutex guards the whole keyspace, so every [`RankStore`] call runs as
//! one atomic unit, the same consistency a networked substrate provides
//! through server-side scripting. Registered scripts are validated by id and
//! kind on every invocation.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{RankError, Result};
use crate::store::{Order, RankStore, ScoredMember, ScriptId, ScriptKind, ScriptSpec};

#[derive(Debug, Default)]
struct Inner {
    keys: HashMap<String, HashMap<String, i64>>,
    scripts: Vec<ScriptSpec>,
}

impl Inner {
    fn script(&self, id: ScriptId, expected: ScriptKind) -> Result<ScriptSpec> {
        let spec = self
            .scripts
            .get(id.0 as usize)
            .copied()
            .ok_or(RankError::UnknownScript(id))?;
        if spec.kind != expected {
            return Err(RankError::ScriptKindMismatch {
                id,
                registered: spec.kind,
                expected,
            });
        }
        Ok(spec)
    }
}

/// Members of a key in policy order. Ties order reverse-lexicographically
/// under `Descending`, mirroring how a reversed range reads a substrate that
/// stores ties lexicographically.
fn sorted_view(entries: &HashMap<String, i64>, order: Order) -> Vec<ScoredMember> {
    let mut view: Vec<ScoredMember> = entries
        .iter()
        .map(|(member, score)| ScoredMember {
            member: member.clone(),
            score: *score,
        })
        .collect();
    match order {
        Order::Descending => {
            view.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| b.member.cmp(&a.member)));
        },
        Order::Ascending => {
            view.sort_by(|a, b| a.score.cmp(&b.score).then_with(|| a.member.cmp(&b.member)));
        },
    }
    view
}

fn range_of(entries: &HashMap<String, i64>, order: Order, start: u64, stop: u64) -> Vec<ScoredMember> {
    if stop < start {
        return Vec::new();
    }
    let view = sorted_view(entries, order);
    let start = start as usize;
    if start >= view.len() {
        return Vec::new();
    }
    let stop = (stop as usize).min(view.len() - 1);
    view[start..=stop].to_vec()
}

/// In-memory [`RankStore`].
#[derive(Debug, Default)]
pub struct MemoryRankStore {
    inner: Mutex<Inner>,
}

impl MemoryRankStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RankStore for MemoryRankStore {
    async fn load_script(&self, spec: ScriptSpec) -> Result<ScriptId> {
        let mut inner = self.inner.lock().unwrap();
        inner.scripts.push(spec);
        Ok(ScriptId(inner.scripts.len() as u64 - 1))
    }

    async fn delete_key(&self, key: &str) -> Result<()> {
        self.inner.lock().unwrap().keys.remove(key);
        Ok(())
    }

    async fn set_score(&self, key: &str, member: &str, score: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .keys
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(())
    }

    async fn incr_score(&self, key: &str, member: &str, delta: i64) -> Result<i64> {
        let mut inner = self.inner.lock().unwrap();
        let score = inner
            .keys
            .entry(key.to_string())
            .or_default()
            .entry(member.to_string())
            .or_insert(0);
        *score += delta;
        Ok(*score)
    }

    async fn remove_member(&self, key: &str, member: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entries) = inner.keys.get_mut(key) {
            entries.remove(member);
        }
        Ok(())
    }

    async fn card(&self, key: &str) -> Result<u64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.keys.get(key).map_or(0, |entries| entries.len() as u64))
    }

    async fn score_and_rank(
        &self,
        script: ScriptId,
        key: &str,
        member: &str,
    ) -> Result<Option<(i64, u64)>> {
        let inner = self.inner.lock().unwrap();
        let spec = inner.script(script, ScriptKind::ScoreAndRank)?;
        let Some(entries) = inner.keys.get(key) else {
            return Ok(None);
        };
        let view = sorted_view(entries, spec.order);
        Ok(view
            .iter()
            .position(|e| e.member == member)
            .map(|pos| (view[pos].score, pos as u64)))
    }

    async fn position(&self, script: ScriptId, key: &str, member: &str) -> Result<Option<u64>> {
        let inner = self.inner.lock().unwrap();
        let spec = inner.script(script, ScriptKind::Position)?;
        let Some(entries) = inner.keys.get(key) else {
            return Ok(None);
        };
        let view = sorted_view(entries, spec.order);
        Ok(view
            .iter()
            .position(|e| e.member == member)
            .map(|pos| pos as u64))
    }

    async fn range(
        &self,
        script: ScriptId,
        key: &str,
        start: u64,
        stop: u64,
    ) -> Result<Vec<ScoredMember>> {
        let inner = self.inner.lock().unwrap();
        let spec = inner.script(script, ScriptKind::Range)?;
        let Some(entries) = inner.keys.get(key) else {
            return Ok(Vec::new());
        };
        Ok(range_of(entries, spec.order, start, stop))
    }

    async fn range_with_card(
        &self,
        script: ScriptId,
        key: &str,
        start: u64,
        stop: u64,
    ) -> Result<(Vec<ScoredMember>, u64)> {
        let inner = self.inner.lock().unwrap();
        let spec = inner.script(script, ScriptKind::Range)?;
        let Some(entries) = inner.keys.get(key) else {
            return Ok((Vec::new(), 0));
        };
        Ok((
            range_of(entries, spec.order, start, stop),
            entries.len() as u64,
        ))
    }

    async fn rank_from_score(&self, script: ScriptId, key: &str, score: i64) -> Result<u64> {
        let inner = self.inner.lock().unwrap();
        let spec = inner.script(script, ScriptKind::RankFromScore)?;
        let Some(entries) = inner.keys.get(key) else {
            return Ok(1);
        };
        let mut better: Vec<i64> = entries
            .values()
            .copied()
            .filter(|s| match spec.order {
                Order::Descending => *s > score,
                Order::Ascending => *s < score,
            })
            .collect();
        better.sort_unstable();
        better.dedup();
        Ok(better.len() as u64 + 1)
    }

    async fn total_score(&self, script: ScriptId, key: &str, start: u64, stop: u64) -> Result<i64> {
        let inner = self.inner.lock().unwrap();
        let spec = inner.script(script, ScriptKind::TotalScore)?;
        let Some(entries) = inner.keys.get(key) else {
            return Ok(0);
        };
        Ok(range_of(entries, spec.order, start, stop)
            .iter()
            .map(|e| e.score)
            .sum())
    }

    async fn copy_key(&self, script: ScriptId, src: &str, dest: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.script(script, ScriptKind::CopyKey)?;
        match inner.keys.get(src).cloned() {
            Some(entries) => {
                inner.keys.insert(dest.to_string(), entries);
            },
            None => {
                inner.keys.remove(dest);
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(kind: ScriptKind, order: Order) -> (MemoryRankStore, ScriptId) {
        let store = MemoryRankStore::new();
        let id = store.load_script(ScriptSpec { kind, order }).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn score_and_rank_reports_position() {
        let (store, id) = store_with(ScriptKind::ScoreAndRank, Order::Descending).await;
        store.set_score("b", "Pantheon", 500).await.unwrap();
        store.set_score("b", "Odin", 400).await.unwrap();
        store.set_score("b", "Artemis", 300).await.unwrap();

        assert_eq!(
            store.score_and_rank(id, "b", "Odin").await.unwrap(),
            Some((400, 1))
        );
        assert_eq!(store.score_and_rank(id, "b", "nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn descending_ties_order_reverse_lexicographically() {
        let (store, id) = store_with(ScriptKind::Range, Order::Descending).await;
        store.set_score("b", "alpha", 100).await.unwrap();
        store.set_score("b", "zeta", 100).await.unwrap();
        store.set_score("b", "mid", 50).await.unwrap();

        let view = store.range(id, "b", 0, 2).await.unwrap();
        let members: Vec<&str> = view.iter().map(|e| e.member.as_str()).collect();
        assert_eq!(members, vec!["zeta", "alpha", "mid"]);
    }

    #[tokio::test]
    async fn ascending_order_flips_the_view() {
        let (store, id) = store_with(ScriptKind::Range, Order::Ascending).await;
        store.set_score("b", "fast", 12).await.unwrap();
        store.set_score("b", "slow", 95).await.unwrap();

        let view = store.range(id, "b", 0, 1).await.unwrap();
        assert_eq!(view[0].member, "fast");
        assert_eq!(view[1].member, "slow");
    }

    #[tokio::test]
    async fn rank_from_score_counts_distinct_better_values() {
        let (store, id) = store_with(ScriptKind::RankFromScore, Order::Descending).await;
        store.set_score("b", "a", 100).await.unwrap();
        store.set_score("b", "b", 100).await.unwrap();
        store.set_score("b", "c", 50).await.unwrap();

        assert_eq!(store.rank_from_score(id, "b", 100).await.unwrap(), 1);
        assert_eq!(store.rank_from_score(id, "b", 50).await.unwrap(), 2);
        assert_eq!(store.rank_from_score(id, "b", 10).await.unwrap(), 3);
        assert_eq!(store.rank_from_score(id, "missing", 10).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn incr_creates_absent_member() {
        let store = MemoryRankStore::new();
        assert_eq!(store.incr_score("b", "new", -7).await.unwrap(), -7);
        assert_eq!(store.incr_score("b", "new", 10).await.unwrap(), 3);
        assert_eq!(store.card("b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn remove_member_is_idempotent() {
        let store = MemoryRankStore::new();
        store.set_score("b", "gone", 5).await.unwrap();
        store.remove_member("b", "gone").await.unwrap();
        store.remove_member("b", "gone").await.unwrap();
        assert_eq!(store.card("b").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn range_with_card_is_consistent() {
        let (store, id) = store_with(ScriptKind::Range, Order::Descending).await;
        for i in 0..5 {
            store
                .set_score("b", &format!("m{i}"), i * 10)
                .await
                .unwrap();
        }
        let (range, card) = store.range_with_card(id, "b", 0, 1).await.unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(card, 5);

        let (range, card) = store.range_with_card(id, "empty", 0, 1).await.unwrap();
        assert!(range.is_empty());
        assert_eq!(card, 0);
    }

    #[tokio::test]
    async fn copy_key_overwrites_target() {
        let (store, id) = store_with(ScriptKind::CopyKey, Order::Descending).await;
        store.set_score("src", "keep", 7).await.unwrap();
        store.set_score("dst", "stale", 1).await.unwrap();

        store.copy_key(id, "src", "dst").await.unwrap();
        assert_eq!(store.card("dst").await.unwrap(), 1);

        store.copy_key(id, "void", "dst").await.unwrap();
        assert_eq!(store.card("dst").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn wrong_script_kind_rejected() {
        let (store, id) = store_with(ScriptKind::Position, Order::Descending).await;
        let err = store.rank_from_score(id, "b", 10).await.unwrap_err();
        assert!(matches!(err, RankError::ScriptKindMismatch { .. }));

        let err = store
            .position(ScriptId(99), "b", "nobody")
            .await
            .unwrap_err();
        assert!(matches!(err, RankError::UnknownScript(_)));
    }

    #[tokio::test]
    async fn range_bounds_clamp_to_view() {
        let (store, id) = store_with(ScriptKind::Range, Order::Descending).await;
        store.set_score("b", "only", 1).await.unwrap();

        assert_eq!(store.range(id, "b", 0, 99).await.unwrap().len(), 1);
        assert!(store.range(id, "b", 5, 9).await.unwrap().is_empty());
        assert!(store.range(id, "b", 3, 1).await.unwrap().is_empty());
    }
}
