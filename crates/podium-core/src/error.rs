use thiserror::Error;

use crate::store::{ScriptId, ScriptKind};

/// Ranking engine error.
///
/// Absent members are not errors: read paths report them as `None` or an
/// empty list. This taxonomy covers substrate failures, script misuse, and
/// inputs rejected before they reach the substrate.
#[derive(Debug, Error)]
pub enum RankError {
    /// The substrate could not be reached or refused a script registration.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A script was invoked with an id the store never handed out.
    #[error("unknown script {0}")]
    UnknownScript(ScriptId),

    /// A script id was used for an operation it was not registered for.
    #[error("script {id} is registered as {registered:?}, not {expected:?}")]
    ScriptKindMismatch {
        id: ScriptId,
        registered: ScriptKind,
        expected: ScriptKind,
    },

    /// Input rejected before reaching the substrate.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for ranking operations.
pub type Result<T> = std::result::Result<T, RankError>;
