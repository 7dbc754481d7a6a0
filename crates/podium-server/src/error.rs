use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use podium_core::RankError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) | Self::Unavailable(m) | Self::Internal(m) => {
                write!(f, "{m}")
            },
        }
    }
}

impl From<RankError> for AppError {
    fn from(err: RankError) -> Self {
        match err {
            RankError::StoreUnavailable(m) => Self::Unavailable(m),
            RankError::InvalidInput(m) => Self::BadRequest(m),
            other @ (RankError::UnknownScript(_) | RankError::ScriptKindMismatch { .. }) => {
                Self::Internal(other.to_string())
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            Self::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            Self::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
            Self::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
        };
        if matches!(self, Self::Unavailable(_) | Self::Internal(_)) {
            tracing::error!(%status, message, "request failed");
        }
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
