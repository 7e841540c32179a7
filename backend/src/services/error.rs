//! Error taxonomy of the scheduling services.

use crate::db::repository::RepositoryError;

/// Errors surfaced by the scheduling services.
///
/// Nothing here is retried or rolled back by the services themselves.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Malformed or missing input, rejected before any expansion or mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The targeted record is gone.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage or transport failure.
    #[error(transparent)]
    Repository(RepositoryError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

impl ScheduleError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<RepositoryError> for ScheduleError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => ScheduleError::NotFound(message),
            RepositoryError::ValidationError { message, .. } => ScheduleError::Validation(message),
            other => ScheduleError::Repository(other),
        }
    }
}
