// ==========================================
// Production Scheduling Engine - domain layer
// ==========================================
// Entities, value types and closed enums. No data access, no engine
// logic lives here.
// ==========================================

pub mod operation;
pub mod schedule;
pub mod types;
pub mod work_center;
pub mod work_order;

// Re-export core types
pub use operation::{Operation, SchedCandidate};
pub use schedule::{
    CapacityReport, OptimizationResult, ProjectedSlot, ProjectionWarning, ScheduleConflict,
    ScheduleEntry, WorkCenterStats,
};
pub use types::{
    ConflictKind, DependencyMode, EntityKind, ExecutionStatus, OperationId, OptimizeCriterion,
    Priority, Severity, StandardTime, WorkCenterId, WorkOrderId,
};
pub use work_center::WorkCenter;
pub use work_order::WorkOrder;
