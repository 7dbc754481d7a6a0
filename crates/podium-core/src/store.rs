//! Contract between the ranking engine and the sorted-set substrate.
//!
//! The substrate executes named atomic scripts: each one is registered once
//! at board construction and addressed afterwards by the opaque id the
//! registration returned. Anything the engine needs to observe atomically is
//! a single trait call here; the engine never composes multi-call
//! transactions of its own.

use std::fmt;

use serde::Serialize;

use crate::error::Result;

/// Ordering policy for a board: which end of the score axis is "better".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Higher score ranks first.
    Descending,
    /// Lower score ranks first.
    Ascending,
}

/// The named atomic scripts a board installs at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptKind {
    /// Score plus 0-based position of one member, read in one step.
    ScoreAndRank,
    /// 0-based position of one member.
    Position,
    /// (member, score) pairs over an inclusive 0-based position range.
    Range,
    /// 1-based standing of a score value: one plus the number of distinct
    /// strictly better score values present under the key.
    RankFromScore,
    /// Sum of scores over an inclusive position range.
    TotalScore,
    /// Atomic duplicate of one key onto another, overwriting the target.
    CopyKey,
}

/// Registration request: which script, compiled for which ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptSpec {
    pub kind: ScriptKind,
    pub order: Order,
}

/// Opaque handle to a registered script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptId(pub u64);

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One (member, score) pair as stored under a ranked key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: i64,
}

/// Sorted-set substrate with atomic server-side scripts.
///
/// Keys are shared mutable state: concurrent callers may hit the same key at
/// any time, and every method must behave as one atomic unit.
#[async_trait::async_trait]
pub trait RankStore: Send + Sync {
    /// Register a script. Fails with `StoreUnavailable` when the substrate
    /// cannot accept registrations, which aborts board construction.
    async fn load_script(&self, spec: ScriptSpec) -> Result<ScriptId>;

    /// Delete a whole key. Deleting an absent key is a no-op.
    async fn delete_key(&self, key: &str) -> Result<()>;

    /// Upsert one member's score.
    async fn set_score(&self, key: &str, member: &str, score: i64) -> Result<()>;

    /// Atomically add `delta` to a member's score, creating the member with
    /// score `delta` when absent. Returns the new score.
    async fn incr_score(&self, key: &str, member: &str, delta: i64) -> Result<i64>;

    /// Remove one member. Removing an absent member is a no-op.
    async fn remove_member(&self, key: &str, member: &str) -> Result<()>;

    /// Number of members under a key.
    async fn card(&self, key: &str) -> Result<u64>;

    /// Score and 0-based position of a member, or `None` when absent.
    async fn score_and_rank(
        &self,
        script: ScriptId,
        key: &str,
        member: &str,
    ) -> Result<Option<(i64, u64)>>;

    /// 0-based position of a member, or `None` when absent.
    async fn position(&self, script: ScriptId, key: &str, member: &str) -> Result<Option<u64>>;

    /// Members whose 0-based position lies in `[start, stop]`, in policy
    /// order. Out-of-range bounds yield a truncated or empty result.
    async fn range(
        &self,
        script: ScriptId,
        key: &str,
        start: u64,
        stop: u64,
    ) -> Result<Vec<ScoredMember>>;

    /// `range` combined with `card` in one atomic unit, so pagination math
    /// never sees a count from a different instant than the page itself.
    async fn range_with_card(
        &self,
        script: ScriptId,
        key: &str,
        start: u64,
        stop: u64,
    ) -> Result<(Vec<ScoredMember>, u64)>;

    /// 1-based standing of a score value (see [`ScriptKind::RankFromScore`]).
    async fn rank_from_score(&self, script: ScriptId, key: &str, score: i64) -> Result<u64>;

    /// Sum of scores over the inclusive position range `[start, stop]`.
    async fn total_score(&self, script: ScriptId, key: &str, start: u64, stop: u64) -> Result<i64>;

    /// Duplicate `src` onto `dest`, overwriting `dest` entirely.
    async fn copy_key(&self, script: ScriptId, src: &str, dest: &str) -> Result<()>;
}
