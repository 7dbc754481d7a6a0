use axum::extract::{Query, State};
use axum::response::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use podium_core::{ListPage, RankError, RankedProfileEntry};

use crate::error::AppError;
use crate::state::AppState;

const MAX_MEMBER_LEN: usize = 128;

/// Boundary validation for member identifiers: non-empty, bounded length.
/// Rejected input never reaches the substrate.
fn validate_member(member: &str) -> Result<(), RankError> {
    if member.is_empty() {
        return Err(RankError::InvalidInput(
            "member must not be empty".to_string(),
        ));
    }
    if member.len() > MAX_MEMBER_LEN {
        return Err(RankError::InvalidInput(format!(
            "member exceeds {MAX_MEMBER_LEN} chars"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
}

/// GET /list?page=N — one settled page of the board.
pub async fn get_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListPage>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = state.config.board.page_size;
    let list = state.leaderboard.get_list(page, page_size).await?;
    Ok(Json(list))
}

/// The composite ranking view: enriched top list, the optional "where am I"
/// window for a tracked player below the fold, the week-award standings, and
/// the cycle fields the view renders alongside them.
#[derive(Debug, Serialize)]
pub struct TopListResponse {
    pub list: Vec<RankedProfileEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearby: Option<Vec<RankedProfileEntry>>,
    pub week_awards: Vec<RankedProfileEntry>,
    pub day: u8,
    pub week_ended: bool,
    pub awarded: bool,
    pub tracked_player: Option<String>,
    pub total_pool: i64,
}

/// GET /toplist — the composite view.
pub async fn get_top_list(
    State(state): State<AppState>,
) -> Result<Json<TopListResponse>, AppError> {
    let now = Utc::now();
    let (day, week_ended, awarded, tracked_player, total_pool) = {
        let cycle = state.cycle.read().await;
        (
            cycle.day,
            cycle.week_ended,
            cycle.awarded,
            cycle.tracked_player.clone(),
            cycle.last_pool,
        )
    };

    let top_size = state.config.board.top_size;
    let (list, nearby) = match &tracked_player {
        Some(member) => {
            let view = state
                .leaderboard
                .get_top_list_with_neighbors(member, top_size, now)
                .await?;
            (view.list, view.nearby)
        },
        None => (state.leaderboard.get_top_list(top_size, now).await?, None),
    };
    let week_awards = state.leaderboard.get_week_awards(now).await?;

    Ok(Json(TopListResponse {
        list,
        nearby,
        week_awards,
        day,
        week_ended,
        awarded,
        tracked_player,
        total_pool,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ModifyBody {
    pub member: String,
    pub delta: i64,
}

/// POST /modify — atomic score delta, creating the member when absent.
pub async fn post_modify(
    State(state): State<AppState>,
    Json(body): Json<ModifyBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_member(&body.member)?;
    if body.delta == 0 {
        return Err(AppError::from(RankError::InvalidInput(
            "delta must be non-zero".to_string(),
        )));
    }
    let new_score = state
        .leaderboard
        .modify_score(&body.member, body.delta)
        .await?;
    tracing::debug!(
        member = body.member.as_str(),
        delta = body.delta,
        new_score,
        "score modified"
    );
    Ok(Json(serde_json::json!({})))
}

#[derive(Debug, Deserialize)]
pub struct MemberBody {
    pub member: String,
}

/// POST /remove — delete one member; removing an absent member succeeds.
pub async fn post_remove(
    State(state): State<AppState>,
    Json(body): Json<MemberBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_member(&body.member)?;
    state.leaderboard.remove(&body.member).await?;
    Ok(Json(serde_json::json!({})))
}

/// POST /clear — delete the board, its snapshot, and the award ledger.
pub async fn post_clear(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.leaderboard.clear(Utc::now()).await?;
    Ok(Json(serde_json::json!({})))
}

/// POST /week/reset — full clear plus cycle state back to day one.
pub async fn post_week_reset(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.leaderboard.clear(Utc::now()).await?;
    state.cycle.write().await.reset();
    tracing::info!("week reset");
    Ok(Json(serde_json::json!({})))
}

#[derive(Debug, Serialize)]
pub struct PickResponse {
    pub member: String,
}

/// POST /player/pick — track a uniformly random ranked member.
pub async fn post_pick_player(
    State(state): State<AppState>,
) -> Result<Json<PickResponse>, AppError> {
    let Some(member) = state.leaderboard.random_member().await? else {
        return Err(AppError::NotFound("board is empty".to_string()));
    };
    state.cycle.write().await.tracked_player = Some(member.clone());
    tracing::info!(member = member.as_str(), "tracked player picked");
    Ok(Json(PickResponse { member }))
}
