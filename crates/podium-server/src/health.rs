use axum::Json;
use axum::extract::State;
use serde::Serialize;

use podium_core::CyclePhase;

use crate::error::AppError;
use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub members: u64,
    pub phase: CyclePhase,
}

/// Structured health check endpoint. Returns server status, board size, and
/// the cycle phase as JSON.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, AppError> {
    let members = state.leaderboard.count().await?;
    let phase = state.cycle.read().await.phase();
    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        members,
        phase,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            members: 12,
            phase: CyclePhase::Accumulating,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"healthy\""));
        assert!(json.contains("\"members\":12"));
        assert!(json.contains("\"accumulating\""));
    }
}
