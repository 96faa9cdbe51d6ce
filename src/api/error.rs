// ==========================================
// Production Scheduling Engine - API layer error types
// ==========================================
// Converts repository and engine errors into the caller-facing
// taxonomy. Every message carries an explicit reason; nothing is
// swallowed on the way up.
// ==========================================

use crate::engine::error::SchedulingError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // Caller-recoverable errors
    // ==========================================
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// All-or-nothing operation refused; nothing was changed.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Lost optimistic-concurrency race; the message names the state
    /// that actually holds.
    #[error("stale state: {0}")]
    StaleState(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // ==========================================
    // Infrastructure errors
    // ==========================================
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::StaleState { .. } => ApiError::StaleState(err.to_string()),
            RepositoryError::Conflict(msg) => ApiError::Conflict(msg),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::Conflict(msg),
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("field {}: {}", field, message))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidSequence { reason } => ApiError::InvalidSequence(reason),
            SchedulingError::InvalidTransition { .. } => {
                ApiError::InvalidTransition(err.to_string())
            }
            SchedulingError::DependenciesUnsatisfied { .. } => ApiError::Conflict(err.to_string()),
            SchedulingError::Repository(repo) => repo.into(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{EntityKind, ExecutionStatus};

    #[test]
    fn test_repository_error_conversion() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "WorkOrder".to_string(),
            id: "17".to_string(),
        }
        .into();
        match err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("WorkOrder"));
                assert!(msg.contains("17"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }

        let err: ApiError = RepositoryError::StaleState {
            entity: "Operation".to_string(),
            id: 3,
            expected: "pending".to_string(),
            actual: "cancelled".to_string(),
        }
        .into();
        match err {
            ApiError::StaleState(msg) => assert!(msg.contains("cancelled")),
            other => panic!("expected StaleState, got {:?}", other),
        }
    }

    #[test]
    fn test_scheduling_error_conversion() {
        let err: ApiError = SchedulingError::InvalidTransition {
            entity: EntityKind::Operation,
            from: ExecutionStatus::Completed,
            to: ExecutionStatus::InProgress,
        }
        .into();
        match err {
            ApiError::InvalidTransition(msg) => {
                assert!(msg.contains("completed"));
                assert!(msg.contains("in_progress"));
            }
            other => panic!("expected InvalidTransition, got {:?}", other),
        }
    }
}
