//! Generic ranking engine over a [`RankStore`].
//!
//! A board owns one ranked key plus the script handles it registered at
//! construction. Ordering policy is a value picked at construction, not a
//! property of the engine: a descending board and an ascending board run the
//! same code against differently-compiled scripts.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{RankError, Result};
use crate::store::{Order, RankStore, ScoredMember, ScriptId, ScriptKind, ScriptSpec};

/// Bounded window the total-score aggregation covers (positions 0..=100).
pub const TOTAL_SCORE_WINDOW: u64 = 100;

/// One entry after rank settlement. `rank` is 1-based and tie-sharing:
/// members with equal score carry the same rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub member: String,
    pub score: i64,
    pub rank: u64,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
    pub page: u64,
    pub max_page: u64,
    pub total: u64,
    pub list: Vec<RankedEntry>,
}

/// Handles for the six scripts a board registers at construction.
#[derive(Debug, Clone, Copy)]
struct Scripts {
    score_and_rank: ScriptId,
    position: ScriptId,
    range: ScriptId,
    rank_from_score: ScriptId,
    total_score: ScriptId,
    copy_key: ScriptId,
}

/// Ranked storage for one named key: scored upserts, atomic deltas,
/// tie-aware rank queries, pagination, and neighbor windows.
pub struct RankedBoard<S> {
    store: Arc<S>,
    key: String,
    order: Order,
    scripts: Scripts,
}

impl<S: RankStore> RankedBoard<S> {
    /// Build a board over `key`, registering every script it will need.
    /// Fails with `StoreUnavailable` when the substrate refuses any
    /// registration; a board never exists with a partial script set.
    pub async fn create(store: Arc<S>, key: impl Into<String>, order: Order) -> Result<Self> {
        let key = key.into();
        let load = |kind| store.load_script(ScriptSpec { kind, order });
        let scripts = Scripts {
            score_and_rank: load(ScriptKind::ScoreAndRank).await?,
            position: load(ScriptKind::Position).await?,
            range: load(ScriptKind::Range).await?,
            rank_from_score: load(ScriptKind::RankFromScore).await?,
            total_score: load(ScriptKind::TotalScore).await?,
            copy_key: load(ScriptKind::CopyKey).await?,
        };
        tracing::debug!(key, ?order, "ranked board created");
        Ok(Self {
            store,
            key,
            order,
            scripts,
        })
    }

    /// The live board key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Upsert one member's score on the live board.
    pub async fn set_score(&self, member: &str, score: i64) -> Result<()> {
        self.store.set_score(&self.key, member, score).await
    }

    /// Upsert one member's score under an arbitrary key (snapshot seeding).
    pub async fn set_score_in(&self, key: &str, member: &str, score: i64) -> Result<()> {
        self.store.set_score(key, member, score).await
    }

    /// Atomically add `delta`, creating the member with score `delta` when
    /// absent. Returns the new score.
    pub async fn modify_score(&self, member: &str, delta: i64) -> Result<i64> {
        self.store.incr_score(&self.key, member, delta).await
    }

    /// Remove one member. Removing an absent member is a no-op.
    pub async fn remove(&self, member: &str) -> Result<()> {
        self.store.remove_member(&self.key, member).await
    }

    /// Delete the board key entirely.
    pub async fn clear(&self) -> Result<()> {
        self.store.delete_key(&self.key).await
    }

    /// 0-based position of a member on the live board, no tie adjustment.
    pub async fn get_position(&self, member: &str) -> Result<Option<u64>> {
        self.store
            .position(self.scripts.position, &self.key, member)
            .await
    }

    /// Score and 1-based rank of a member, read in one atomic step against
    /// `key` (the live board or any snapshot key). `None` when absent.
    pub async fn get_score_and_rank(&self, member: &str, key: &str) -> Result<Option<(i64, u64)>> {
        let found = self
            .store
            .score_and_rank(self.scripts.score_and_rank, key, member)
            .await?;
        Ok(found.map(|(score, pos)| (score, pos + 1)))
    }

    /// `(member, score)` pairs with 0-based positions in `[start, stop]`
    /// inclusive, in policy order, against `key`.
    pub async fn get_range(&self, start: u64, stop: u64, key: &str) -> Result<Vec<ScoredMember>> {
        self.store.range(self.scripts.range, key, start, stop).await
    }

    /// `get_range` against the live board combined with the member count in
    /// one atomic unit, so pagination math never mixes a count from one
    /// instant with a page from another.
    pub async fn get_range_with_total(
        &self,
        start: u64,
        stop: u64,
    ) -> Result<(Vec<ScoredMember>, u64)> {
        self.store
            .range_with_card(self.scripts.range, &self.key, start, stop)
            .await
    }

    /// Sum of scores over positions `[0, TOTAL_SCORE_WINDOW]` on the live
    /// board. The weekly prize pool base.
    pub async fn get_total_score(&self) -> Result<i64> {
        self.store
            .total_score(self.scripts.total_score, &self.key, 0, TOTAL_SCORE_WINDOW)
            .await
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.card(&self.key).await
    }

    /// Atomically duplicate the live board onto `dest`, overwriting it.
    pub async fn copy_to(&self, dest: &str) -> Result<()> {
        self.store
            .copy_key(self.scripts.copy_key, &self.key, dest)
            .await
    }

    /// Delete an arbitrary key (snapshot or sub-ledger cleanup).
    pub async fn delete_key(&self, key: &str) -> Result<()> {
        self.store.delete_key(key).await
    }

    /// One page of the live board, 1-based. Page math:
    /// `start = page_size * (page - 1)`, `stop = start + page_size - 1`,
    /// `max_page = ceil(total / page_size)`. The page and the total come from
    /// one atomic read; entries are rank-settled and finally ordered by
    /// `(rank, member)` so ties list deterministically. A page past the last
    /// one yields an empty list with the correct `total` and `max_page`; the
    /// bounds saturate so an arbitrarily large page number stays in range.
    pub async fn get_list(&self, page: u64, page_size: u64) -> Result<ListPage> {
        if page_size == 0 {
            return Err(RankError::InvalidInput(
                "page_size must be > 0".to_string(),
            ));
        }
        let start = page.saturating_sub(1).saturating_mul(page_size);
        let stop = start.saturating_add(page_size - 1);
        let (entries, total) = self.get_range_with_total(start, stop).await?;
        let mut list = self.settle_ranks(&entries, &self.key).await?;
        list.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.member.cmp(&b.member)));
        Ok(ListPage {
            page,
            max_page: total.div_ceil(page_size),
            total,
            list,
        })
    }

    /// Rank-settled window of `radius` positions either side of a member.
    /// A member close enough to the top that the window would start below
    /// zero gets `[0, 2*radius]` instead of a symmetric window. Empty when
    /// the member is absent.
    pub async fn get_neighbors(&self, member: &str, radius: u64) -> Result<Vec<RankedEntry>> {
        let Some(pos) = self.get_position(member).await? else {
            return Ok(Vec::new());
        };
        let (start, stop) = if pos < radius {
            (0, 2 * radius)
        } else {
            (pos - radius, pos + radius)
        };
        let entries = self.get_range(start, stop, &self.key).await?;
        self.settle_ranks(&entries, &self.key).await
    }

    /// Settle tie-aware 1-based ranks over a page of entries already sorted
    /// in policy order. Sequential by construction: each entry's rank
    /// depends on the previous entry's resolved rank.
    ///
    /// Per entry, in order:
    /// 1. score equals the previous entry's score: share its rank;
    /// 2. otherwise, once two remote samples have been taken this pass:
    ///    previous rank + 1, locally;
    /// 3. otherwise: remote rank-from-score query against `key`.
    ///
    /// Rule 2 is sound only for contiguous ranges: two remote-verified ranks
    /// pin the page's density, after which each distinct worse score is
    /// exactly one rank further. Callers feeding a non-contiguous slice can
    /// get silently wrong ranks past the second sample; every caller in this
    /// crate passes a contiguous range.
    pub async fn settle_ranks(
        &self,
        entries: &[ScoredMember],
        key: &str,
    ) -> Result<Vec<RankedEntry>> {
        let mut settled = Vec::with_capacity(entries.len());
        let mut prev: Option<(i64, u64)> = None;
        let mut remote_samples = 0u32;
        for entry in entries {
            let rank = match prev {
                Some((prev_score, prev_rank)) if prev_score == entry.score => prev_rank,
                Some((_, prev_rank)) if remote_samples >= 2 => prev_rank + 1,
                _ => {
                    let rank = self
                        .store
                        .rank_from_score(self.scripts.rank_from_score, key, entry.score)
                        .await?;
                    remote_samples += 1;
                    tracing::trace!(key, score = entry.score, rank, "remote rank sample");
                    rank
                },
            };
            prev = Some((entry.score, rank));
            settled.push(RankedEntry {
                member: entry.member.clone(),
                score: entry.score,
                rank,
            });
        }
        Ok(settled)
    }
}
