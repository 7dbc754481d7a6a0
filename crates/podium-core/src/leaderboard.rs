//! Descending leaderboard: a [`RankedBoard`] plus profile enrichment,
//! date-labeled snapshots for rank deltas, and the week-award sub-ledger.
//!
//! Snapshot keys are `"{board}_{YYYYMMDD}"`, always labeled with the day
//! before the clock value the caller passes in. Callers inject the clock so
//! tests pin it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::board::{RankedBoard, RankedEntry, TOTAL_SCORE_WINDOW};
use crate::error::Result;
use crate::profile::ProfileStore;
use crate::store::{Order, RankStore};
use crate::time::yesterday_label;

/// Fixed key of the week-award sub-ledger.
pub const WEEK_AWARDS_KEY: &str = "weekAwards";

/// Window radius of the "where am I" view around the tracked player.
pub const NEIGHBOR_RADIUS: u64 = 3;

/// A settled entry enriched from the profile store and yesterday's snapshot.
/// `rank_change = yesterday_rank - rank`; positive means improved, zero when
/// no snapshot entry exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedProfileEntry {
    pub member: String,
    pub score: i64,
    pub rank: u64,
    pub rank_change: i64,
    pub name: String,
    pub age: u32,
}

/// Top list plus the optional neighbor window for a tracked player ranked
/// below the visible top.
#[derive(Debug, Clone, Serialize)]
pub struct TopListView {
    pub list: Vec<RankedProfileEntry>,
    pub nearby: Option<Vec<RankedProfileEntry>>,
}

/// Descending-is-better board with enrichment and snapshot rotation.
pub struct Leaderboard<S, P> {
    board: RankedBoard<S>,
    profiles: Arc<P>,
}

impl<S: RankStore, P: ProfileStore> Leaderboard<S, P> {
    /// Build the descending board and perform the initial snapshot rotation
    /// so yesterday's label always resolves.
    pub async fn create(
        store: Arc<S>,
        name: impl Into<String>,
        profiles: Arc<P>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let board = RankedBoard::create(store, name, Order::Descending).await?;
        let lb = Self { board, profiles };
        lb.rotate_snapshot(now).await?;
        Ok(lb)
    }

    pub fn board(&self) -> &RankedBoard<S> {
        &self.board
    }

    fn snapshot_key(&self, now: DateTime<Utc>) -> String {
        format!("{}_{}", self.board.key(), yesterday_label(now))
    }

    /// Two-step write: upsert the live score, then ensure a snapshot
    /// baseline exists for the member. The baseline is first-write-wins: an
    /// existing snapshot value is never overwritten, so the day's first
    /// score becomes the delta reference for a member the rotation missed.
    pub async fn set_score(&self, member: &str, score: i64, now: DateTime<Utc>) -> Result<()> {
        self.board.set_score(member, score).await?;
        self.seed_snapshot(member, score, now).await
    }

    async fn seed_snapshot(&self, member: &str, score: i64, now: DateTime<Utc>) -> Result<()> {
        let snapshot = self.snapshot_key(now);
        if self
            .board
            .get_score_and_rank(member, &snapshot)
            .await?
            .is_none()
        {
            self.board.set_score_in(&snapshot, member, score).await?;
        }
        Ok(())
    }

    /// Duplicate the live board onto yesterday's snapshot key, overwriting
    /// it. The only way a whole snapshot is created or refreshed.
    pub async fn rotate_snapshot(&self, now: DateTime<Utc>) -> Result<()> {
        let snapshot = self.snapshot_key(now);
        tracing::info!(board = self.board.key(), snapshot = snapshot.as_str(), "rotating snapshot");
        self.board.copy_to(&snapshot).await
    }

    /// Full new-cycle reset: the live board, the current snapshot, and the
    /// week-award sub-ledger are all deleted.
    pub async fn clear(&self, now: DateTime<Utc>) -> Result<()> {
        tracing::info!(board = self.board.key(), "clearing board for a new cycle");
        self.board.clear().await?;
        self.board.delete_key(&self.snapshot_key(now)).await?;
        self.board.delete_key(WEEK_AWARDS_KEY).await
    }

    pub async fn modify_score(&self, member: &str, delta: i64) -> Result<i64> {
        self.board.modify_score(member, delta).await
    }

    pub async fn remove(&self, member: &str) -> Result<()> {
        self.board.remove(member).await
    }

    pub async fn get_list(&self, page: u64, page_size: u64) -> Result<crate::board::ListPage> {
        self.board.get_list(page, page_size).await
    }

    pub async fn get_position(&self, member: &str) -> Result<Option<u64>> {
        self.board.get_position(member).await
    }

    pub async fn get_total_score(&self) -> Result<i64> {
        self.board.get_total_score().await
    }

    pub async fn count(&self) -> Result<u64> {
        self.board.count().await
    }

    /// Settled entries in `[0, TOTAL_SCORE_WINDOW]` on the live board,
    /// unenriched. The award cycle's input.
    pub async fn get_award_window(&self) -> Result<Vec<RankedEntry>> {
        let key = self.board.key().to_string();
        let entries = self.board.get_range(0, TOTAL_SCORE_WINDOW, &key).await?;
        self.board.settle_ranks(&entries, &key).await
    }

    /// Enriched top of the board: positions `[0, size]` inclusive, settled,
    /// joined against the profile store and yesterday's snapshot.
    pub async fn get_top_list(
        &self,
        size: u64,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedProfileEntry>> {
        let key = self.board.key().to_string();
        let entries = self.board.get_range(0, size, &key).await?;
        let settled = self.board.settle_ranks(&entries, &key).await?;
        self.enrich(settled, now).await
    }

    /// Top list plus, when the tracked member sits below the visible top, an
    /// enriched neighbor window around them. A tracked member inside the top
    /// (or absent) yields no window.
    pub async fn get_top_list_with_neighbors(
        &self,
        tracked: &str,
        size: u64,
        now: DateTime<Utc>,
    ) -> Result<TopListView> {
        let list = self.get_top_list(size, now).await?;
        let nearby = match self.board.get_position(tracked).await? {
            Some(pos) if pos >= size => {
                let window = self.board.get_neighbors(tracked, NEIGHBOR_RADIUS).await?;
                Some(self.enrich(window, now).await?)
            },
            _ => None,
        };
        Ok(TopListView { list, nearby })
    }

    /// Enriched view of the week-award sub-ledger, positions `[0, 100]`,
    /// settled against the ledger's own rank space.
    pub async fn get_week_awards(&self, now: DateTime<Utc>) -> Result<Vec<RankedProfileEntry>> {
        let entries = self
            .board
            .get_range(0, TOTAL_SCORE_WINDOW, WEEK_AWARDS_KEY)
            .await?;
        let settled = self.board.settle_ranks(&entries, WEEK_AWARDS_KEY).await?;
        self.enrich(settled, now).await
    }

    /// Credit one member's weekly prize: ledger increment first, then the
    /// profile balance. Callers sequence members; this call sequences the
    /// two writes for one member.
    pub async fn credit_award(&self, member: &str, amount: i64) -> Result<()> {
        self.board
            .store()
            .incr_score(WEEK_AWARDS_KEY, member, amount)
            .await?;
        self.profiles.add_balance(member, amount).await
    }

    /// Uniformly random ranked member, `None` on an empty board.
    pub async fn random_member(&self) -> Result<Option<String>> {
        let total = self.board.count().await?;
        if total == 0 {
            return Ok(None);
        }
        let index = rand::rng().random_range(0..total);
        let key = self.board.key().to_string();
        let picked = self.board.get_range(index, index, &key).await?;
        Ok(picked.into_iter().next().map(|e| e.member))
    }

    /// Join settled entries against the profile store and yesterday's
    /// snapshot, one member at a time. A ranked member with no profile
    /// document is dropped from the output.
    async fn enrich(
        &self,
        settled: Vec<RankedEntry>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedProfileEntry>> {
        let snapshot = self.snapshot_key(now);
        let mut enriched = Vec::with_capacity(settled.len());
        for entry in settled {
            let Some(profile) = self.profiles.find(&entry.member).await? else {
                tracing::debug!(member = entry.member.as_str(), "no profile, dropping from view");
                continue;
            };
            let rank_change = match self
                .board
                .get_score_and_rank(&entry.member, &snapshot)
                .await?
            {
                Some((_, yesterday_rank)) => yesterday_rank as i64 - entry.rank as i64,
                None => 0,
            };
            enriched.push(RankedProfileEntry {
                member: entry.member,
                score: entry.score,
                rank: entry.rank,
                rank_change,
                name: profile.name,
                age: profile.age,
            });
        }
        Ok(enriched)
    }
}
