// ==========================================
// Production Scheduling Engine - engine error types
// ==========================================

use crate::domain::types::{EntityKind, ExecutionStatus};
use thiserror::Error;

/// Business-rule failures raised by the engines.
#[derive(Error, Debug)]
pub enum SchedulingError {
    /// Custom-order mismatch: the supplied permutation does not equal
    /// the pending set. Nothing is committed.
    #[error("invalid sequence: {reason}")]
    InvalidSequence { reason: String },

    /// Illegal status edge, named explicitly.
    #[error("invalid transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: EntityKind,
        from: ExecutionStatus,
        to: ExecutionStatus,
    },

    /// A blocking-mode dependency gate refused the transition.
    #[error("unsatisfied dependencies for operation {operation_id}: {unmet:?}")]
    DependenciesUnsatisfied {
        operation_id: i64,
        unmet: Vec<i64>,
    },

    /// Persistence failures propagate unchanged; the engines never
    /// retry on their own.
    #[error(transparent)]
    Repository(#[from] crate::repository::RepositoryError),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;
