// ==========================================
// Production Scheduling Engine - operation entity
// ==========================================
// Modeling constraint: a work order has at most one operation per work
// center (unique pair enforced by schema). This caps routing
// complexity; it is not a general job-shop routing graph.
// ==========================================

use crate::domain::types::{
    ExecutionStatus, OperationId, StandardTime, WorkCenterId, WorkOrderId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of work against one work center for one work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub work_order_id: WorkOrderId,
    pub work_center_id: WorkCenterId,
    /// Persisted ordinal position within the work center queue. An
    /// ordering hint, not authoritative; the sequencer may re-derive it.
    pub sequence_number: i64,
    pub name: String,
    pub standard_time: StandardTime,
    pub quantity_target: Option<i64>,
    /// Monotonically non-decreasing.
    pub quantity_completed: i64,
    pub status: ExecutionStatus,
    /// Unordered set of operations that should complete before this one
    /// may start. Enforcement level is a configuration choice.
    pub dependencies: Vec<OperationId>,
    /// Derived by the timeline projector; overwritten on every run.
    pub estimated_start: Option<DateTime<Utc>>,
    pub estimated_end: Option<DateTime<Utc>>,
    /// Set only by real status transitions, never by projection.
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Operation {
    /// Realized elapsed minutes, when both actual timestamps are set.
    pub fn actual_elapsed_minutes(&self) -> Option<i64> {
        match (self.actual_start, self.actual_end) {
            (Some(start), Some(end)) => Some((end - start).num_minutes()),
            _ => None,
        }
    }
}

// ==========================================
// SchedCandidate - operation paired with parent order attributes
// ==========================================

/// The sequencer's unit of input: a pending operation joined with the
/// parent work order fields its criteria need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedCandidate {
    pub operation: Operation,
    pub work_order_reference: String,
    pub priority: crate::domain::types::Priority,
    pub delivery_date: Option<chrono::NaiveDate>,
    pub assembly_date: Option<chrono::NaiveDate>,
    pub tertiary_date: Option<chrono::NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actual_elapsed_minutes() {
        let start = Utc::now();
        let op = Operation {
            id: 1,
            work_order_id: 1,
            work_center_id: 1,
            sequence_number: 1,
            name: "Milling".to_string(),
            standard_time: StandardTime::Minutes(90),
            quantity_target: Some(10),
            quantity_completed: 0,
            status: ExecutionStatus::Completed,
            dependencies: vec![],
            estimated_start: None,
            estimated_end: None,
            actual_start: Some(start),
            actual_end: Some(start + chrono::Duration::minutes(75)),
            created_at: start,
            updated_at: start,
        };
        assert_eq!(op.actual_elapsed_minutes(), Some(75));

        let mut open = op.clone();
        open.actual_end = None;
        assert_eq!(open.actual_elapsed_minutes(), None);
    }
}
