// ==========================================
// Production Scheduling Engine - core library
// ==========================================
// Scheduling and capacity engine for MES work centers: ordering
// criteria, timeline projection, conflict detection, lifecycle
// control, and realized-capacity reporting over SQLite.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Configuration layer
pub mod config;

// Database infrastructure (connection init / uniform PRAGMAs)
pub mod db;

// Logging
pub mod logging;

// API layer - business facades
pub mod api;

// ==========================================
// Re-exports
// ==========================================

// Domain types
pub use domain::types::{
    DependencyMode, EntityKind, ExecutionStatus, OptimizeCriterion, Priority, StandardTime,
};

// Domain entities and derived values
pub use domain::{
    CapacityReport, Operation, OptimizationResult, ScheduleConflict, ScheduleEntry, WorkCenter,
    WorkOrder,
};

// Engines
pub use engine::{
    CapacityReporter, ConflictDetector, LifecycleController, ScheduleOrchestrator, Sequencer,
    TimelineProjector,
};

// API
pub use api::{ApiError, ApiResult, SchedulingApi, WorkOrderApi};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "mes-scheduler";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
