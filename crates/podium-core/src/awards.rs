//! Weekly prize cycle.
//!
//! Cycle state is an explicit context object owned by whatever schedules the
//! cycle; it is passed in by reference, never held as a global. The cycle
//! itself owns exactly one transition: award-pending to awarded.

use serde::Serialize;

use crate::error::Result;
use crate::leaderboard::Leaderboard;
use crate::profile::ProfileStore;
use crate::store::RankStore;

/// Days in one accumulation cycle.
pub const WEEK_LENGTH: u8 = 7;

/// Deepest rank that earns a share of the pool.
pub const AWARD_DEPTH: u64 = 100;

/// Shared cycle context: day counter, boundary flags, the tracked player
/// pointer, and the last pool paid out.
#[derive(Debug, Clone, Default)]
pub struct CycleState {
    pub day: u8,
    pub week_ended: bool,
    pub awarded: bool,
    pub tracked_player: Option<String>,
    pub last_pool: i64,
}

/// Where the cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Accumulating,
    BoundaryReached,
    AwardPending,
    Awarded,
}

impl CycleState {
    pub fn new() -> Self {
        Self {
            day: 1,
            ..Self::default()
        }
    }

    /// Advance one simulated day. Returns `true` when the day actually
    /// advanced (the caller rotates the snapshot); on the seventh day the
    /// tick observes the week boundary instead and sets `week_ended`.
    pub fn day_tick(&mut self) -> bool {
        if self.day >= WEEK_LENGTH {
            self.week_ended = true;
            false
        } else {
            self.day += 1;
            true
        }
    }

    /// Back to day one with flags cleared. The tracked player survives a
    /// reset; the pool does not.
    pub fn reset(&mut self) {
        self.day = 1;
        self.week_ended = false;
        self.awarded = false;
        self.last_pool = 0;
    }

    pub fn phase(&self) -> CyclePhase {
        if self.awarded {
            CyclePhase::Awarded
        } else if self.week_ended {
            CyclePhase::AwardPending
        } else if self.day >= WEEK_LENGTH {
            CyclePhase::BoundaryReached
        } else {
            CyclePhase::Accumulating
        }
    }

    fn award_due(&self) -> bool {
        self.week_ended && !self.awarded && self.day == WEEK_LENGTH
    }
}

/// Prize for one rank out of a pool: 20% / 15% / 10% for the podium, the
/// remaining 55% split evenly across ranks 4..=100, nothing past 100 or from
/// a negative pool. Truncated toward zero.
pub fn calc_prize(total: i64, rank: u64) -> i64 {
    if total < 0 {
        return 0;
    }
    let pool = total as f64;
    let share = match rank {
        1 => pool * 0.20,
        2 => pool * 0.15,
        3 => pool * 0.10,
        4..=AWARD_DEPTH => pool * 0.55 / 97.0,
        _ => 0.0,
    };
    share as i64
}

/// Outcome of one award poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AwardOutcome {
    /// Precondition not met; nothing happened.
    NotDue,
    /// First due poll after process start: deliberately skipped once so a
    /// cold or partially-populated board never pays out immediately.
    Priming,
    /// Prizes credited and the cycle marked awarded.
    Awarded { pool: i64, credited: usize },
}

/// Owner of the award-pending to awarded transition.
#[derive(Debug, Default)]
pub struct AwardCycle {
    primed: bool,
}

impl AwardCycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the cycle if it is due. Crediting is strictly sequential: one
    /// member's ledger and balance writes both complete before the next
    /// member starts. There is no rollback: a mid-sequence failure leaves
    /// `awarded` false and already-applied credits in place, and the next
    /// poll re-credits from the top. `awarded` flips exactly once, after
    /// every credit has landed.
    pub async fn run_if_due<S: RankStore, P: ProfileStore>(
        &mut self,
        leaderboard: &Leaderboard<S, P>,
        state: &mut CycleState,
    ) -> Result<AwardOutcome> {
        if !state.award_due() {
            return Ok(AwardOutcome::NotDue);
        }
        if !self.primed {
            self.primed = true;
            tracing::info!("award cycle due for the first time, priming no-op");
            return Ok(AwardOutcome::Priming);
        }

        let pool = leaderboard.get_total_score().await?;
        let winners = leaderboard.get_award_window().await?;

        let mut credited = 0usize;
        for entry in &winners {
            let prize = calc_prize(pool, entry.rank);
            leaderboard.credit_award(&entry.member, prize).await?;
            credited += 1;
            tracing::debug!(member = entry.member.as_str(), rank = entry.rank, prize, "credited");
        }

        state.awarded = true;
        state.last_pool = pool;
        tracing::info!(pool, credited, "week awards distributed");
        Ok(AwardOutcome::Awarded { pool, credited })
    }
}
