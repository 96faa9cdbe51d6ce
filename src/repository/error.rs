// ==========================================
// Production Scheduling Engine - repository error types
// ==========================================
// thiserror derive; rusqlite failures are classified, never swallowed.
// ==========================================

use thiserror::Error;

/// Persistence boundary errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Concurrency control =====
    /// A compare-and-swap lost its race: the stored status no longer
    /// matches what the caller read. Carries the observed state so the
    /// loser sees the final truth instead of a masked write.
    #[error("stale state: {entity} id={id}, expected status={expected}, found={actual}")]
    StaleState {
        entity: String,
        id: i64,
        expected: String,
        actual: String,
    },

    // ===== Business conflicts =====
    /// All-or-nothing operation refused; nothing was written.
    #[error("conflict: {0}")]
    Conflict(String),

    // ===== Database =====
    #[error("record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("database connection failure: {0}")]
    DatabaseConnectionError(String),

    #[error("database lock acquisition failed: {0}")]
    LockError(String),

    #[error("database transaction failure: {0}")]
    DatabaseTransactionError(String),

    #[error("database query failure: {0}")]
    DatabaseQueryError(String),

    #[error("unique constraint violation: {0}")]
    UniqueConstraintViolation(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    // ===== Data quality =====
    #[error("validation failure: {0}")]
    ValidationError(String),

    #[error("field value error (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result alias.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
