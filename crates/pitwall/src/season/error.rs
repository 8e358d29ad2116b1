use axum::http::StatusCode;

use super::domain::TeamId;
use super::registry::RegistryError;
use super::store::RepositoryError;

/// Error raised by the season simulator and controller.
#[derive(Debug, thiserror::Error)]
pub enum SeasonError {
    #[error("session {0} not found")]
    SessionNotFound(i64),
    #[error("team {0} not found")]
    TeamNotFound(TeamId),
    #[error("team `{name}` is still referenced by {competitors} competitor(s)")]
    TeamInUse { name: String, competitors: usize },
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("session {index} is stored as {stored} but the calendar defines {requested}")]
    CalendarConflict {
        index: u32,
        stored: String,
        requested: String,
    },
    #[error("season invariant violated: {0}")]
    Invariant(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SeasonError {
    /// HTTP status for this failure, shared by the season router and `AppError`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SeasonError::SessionNotFound(_)
            | SeasonError::TeamNotFound(_)
            | SeasonError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            SeasonError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SeasonError::TeamInUse { .. } | SeasonError::Repository(RepositoryError::Conflict(_)) => {
                StatusCode::CONFLICT
            }
            // bad baseline data aborts startup
            SeasonError::CalendarConflict { .. }
            | SeasonError::Invariant(_)
            | SeasonError::Registry(_)
            | SeasonError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Parse a boolean query flag, accepting the usual spellings.
pub fn parse_flag(name: &str, raw: &str) -> Result<bool, SeasonError> {
    flag_value(raw).ok_or_else(|| {
        SeasonError::Validation(format!(
            "`{name}` must be a boolean flag, got `{}`",
            raw.trim()
        ))
    })
}

pub(crate) fn flag_value(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
