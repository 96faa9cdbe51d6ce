// ==========================================
// Production Scheduling Engine - schedule value types
// ==========================================
// Outputs of the sequencer/projector/detector/reporter pipeline.
// All of these are derived values; none is an aggregate root.
// ==========================================

use crate::domain::types::{
    ConflictKind, OperationId, Severity, StandardTime, WorkOrderId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Schedule entries
// ==========================================

/// One row of an ordered schedule for a work center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub operation_id: OperationId,
    pub work_order_id: WorkOrderId,
    pub work_order_reference: String,
    pub operation_name: String,
    pub standard_time: StandardTime,
    /// 1-based, contiguous position in the committed order.
    pub sequence_order: i64,
    pub estimated_start: Option<DateTime<Utc>>,
    pub estimated_end: Option<DateTime<Utc>>,
}

/// Projected start/end instants for one operation. Advisory only;
/// actual timestamps are never written from a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedSlot {
    pub operation_id: OperationId,
    pub estimated_start: DateTime<Utc>,
    pub estimated_end: DateTime<Utc>,
}

/// Non-fatal findings produced while projecting a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProjectionWarning {
    /// The operation carries no standard time; it was projected with
    /// zero planned duration, which callers must not mistake for a
    /// real estimate.
    UnestimatedOperation { operation_id: OperationId },
}

// ==========================================
// Conflicts
// ==========================================

/// A detected scheduling conflict. Conflicts are data, not errors:
/// the detector annotates the schedule and never aborts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub kind: ConflictKind,
    pub severity: Severity,
    pub message: String,
    /// Present for per-operation conflicts (unsatisfied dependencies).
    pub operation_id: Option<OperationId>,
}

// ==========================================
// Optimization result
// ==========================================

/// The full outcome of an optimize/reorder run for one work center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Correlation id for this run; logged at every commit point.
    pub run_id: Uuid,
    pub work_center_code: String,
    pub entries: Vec<ScheduleEntry>,
    pub conflicts: Vec<ScheduleConflict>,
    pub warnings: Vec<ProjectionWarning>,
    /// End of the last projected slot, when any operation was scheduled.
    pub estimated_completion: Option<DateTime<Utc>>,
}

impl OptimizationResult {
    pub fn total_operations(&self) -> usize {
        self.entries.len()
    }
}

// ==========================================
// Capacity report
// ==========================================

/// Realized utilization/efficiency metrics for one work center over a
/// trailing period. A period with no qualifying history yields the
/// zeroed report, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub work_center_code: String,
    pub period_days: i64,
    pub completed_count: i64,
    pub total_planned_minutes: i64,
    pub avg_planned_minutes: f64,
    pub avg_actual_minutes: f64,
    /// planned / actual * 100, clamped to 200. Zero actual time
    /// reports 0, never a division error.
    pub efficiency_percent: f64,
    pub operations_per_day: f64,
}

impl CapacityReport {
    /// The empty-history report.
    pub fn zeroed(work_center_code: &str, period_days: i64) -> Self {
        Self {
            work_center_code: work_center_code.to_string(),
            period_days,
            completed_count: 0,
            total_planned_minutes: 0,
            avg_planned_minutes: 0.0,
            avg_actual_minutes: 0.0,
            efficiency_percent: 0.0,
            operations_per_day: 0.0,
        }
    }
}

// ==========================================
// Work center operation statistics
// ==========================================

/// Live per-status counts for a work center queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkCenterStats {
    pub total_operations: i64,
    pub pending_operations: i64,
    pub in_progress_operations: i64,
    pub completed_operations: i64,
    pub total_planned_minutes: i64,
    /// Planned minutes still open (pending + in_progress).
    pub open_planned_minutes: i64,
}
