//! Periodic triggers: the simulated day and the award-cycle check.
//!
//! Both run as detached interval loops that skip missed ticks and log
//! failures instead of exiting; a substrate hiccup on one tick leaves the
//! next tick to retry the whole operation. An interval's first tick
//! completes immediately, so each loop consumes it up front: a full period
//! must elapse before the first day advance or award check.

use std::time::Duration;

use chrono::Utc;

use crate::state::AppState;

/// Advance the simulated day each interval. A tick that advances the day
/// rotates the snapshot; the seventh-day tick observes the week boundary
/// instead.
pub fn spawn_day_cycle(state: AppState) {
    let period = Duration::from_secs(state.config.cycle.day_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            let advanced = {
                let mut cycle = state.cycle.write().await;
                let advanced = cycle.day_tick();
                tracing::info!(day = cycle.day, week_ended = cycle.week_ended, "day tick");
                advanced
            };
            if advanced
                && let Err(e) = state.leaderboard.rotate_snapshot(Utc::now()).await
            {
                tracing::warn!(error = %e, "snapshot rotation failed");
            }
        }
    });
}

/// Poll the award precondition each interval and run the cycle when due.
pub fn spawn_award_cycle(state: AppState) {
    let period = Duration::from_secs(state.config.cycle.award_check_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut award = state.award.lock().await;
            let mut cycle = state.cycle.write().await;
            match award.run_if_due(&state.leaderboard, &mut cycle).await {
                Ok(outcome) => tracing::debug!(?outcome, "award check"),
                Err(e) => tracing::warn!(error = %e, "award cycle failed, will retry"),
            }
        }
    });
}
