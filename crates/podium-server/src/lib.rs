pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod jobs;
pub mod state;

use axum::Router;
use axum::routing::{get, post};

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config. Fails when the
/// board cannot be constructed (script registration or initial rotation).
pub async fn build_app(config: ServerConfig) -> podium_core::Result<(Router<()>, AppState)> {
    let state = AppState::new(config).await?;

    let app = Router::new()
        .route("/list", get(api::get_list))
        .route("/toplist", get(api::get_top_list))
        .route("/modify", post(api::post_modify))
        .route("/remove", post(api::post_remove))
        .route("/clear", post(api::post_clear))
        .route("/week/reset", post(api::post_week_reset))
        .route("/player/pick", post(api::post_pick_player))
        .route("/healthz", get(health::health_check))
        .with_state(state.clone());

    Ok((app, state))
}

/// Spawn the periodic triggers when the cycle is enabled.
pub fn spawn_jobs(state: &AppState) {
    if !state.config.cycle.enabled {
        tracing::info!("cycle jobs disabled by config");
        return;
    }
    jobs::spawn_day_cycle(state.clone());
    jobs::spawn_award_cycle(state.clone());
}
