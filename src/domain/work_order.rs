// ==========================================
// Production Scheduling Engine - work order entity
// ==========================================

use crate::domain::types::{ExecutionStatus, Priority, WorkOrderId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A production request for a quantity of a product, decomposed into
/// operations. Operations are owned by the order and never reparented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: WorkOrderId,
    /// Unique business reference.
    pub reference_number: String,
    /// Product reference; not owned by this aggregate.
    pub product_id: i64,
    /// Always > 0.
    pub quantity: i64,
    pub priority: Priority,
    /// Three independent, individually optional target dates. No
    /// ordering invariant is enforced between them; see `date_advisory`.
    pub delivery_date: Option<NaiveDate>,
    pub assembly_date: Option<NaiveDate>,
    pub tertiary_date: Option<NaiveDate>,
    pub status: ExecutionStatus,
    /// Set instead of hard-deleting once any operation has completed;
    /// archived orders keep their capacity-reporting history.
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkOrder {
    /// Advisory check: delivery should not precede assembly when both
    /// dates are present. Returns a human-readable note, never an error.
    pub fn date_advisory(&self) -> Option<String> {
        match (self.delivery_date, self.assembly_date) {
            (Some(delivery), Some(assembly)) if delivery < assembly => Some(format!(
                "delivery date {} precedes assembly date {}",
                delivery, assembly
            )),
            _ => None,
        }
    }

    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Urgent
    }

    /// Overdue: delivery date passed while the order is still open.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.delivery_date {
            Some(date) => {
                date < today
                    && !matches!(
                        self.status,
                        ExecutionStatus::Completed | ExecutionStatus::Cancelled
                    )
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(delivery: Option<NaiveDate>, assembly: Option<NaiveDate>) -> WorkOrder {
        WorkOrder {
            id: 1,
            reference_number: "RN-001".to_string(),
            product_id: 1,
            quantity: 10,
            priority: Priority::Normal,
            delivery_date: delivery,
            assembly_date: assembly,
            tertiary_date: None,
            status: ExecutionStatus::Pending,
            archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_date_advisory_only_when_delivery_precedes_assembly() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let a = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert!(order(Some(d), Some(a)).date_advisory().is_some());
        assert!(order(Some(a), Some(d)).date_advisory().is_none());
        assert!(order(Some(d), None).date_advisory().is_none());
        assert!(order(None, None).date_advisory().is_none());
    }

    #[test]
    fn test_urgency_flag() {
        let mut wo = order(None, None);
        assert!(!wo.is_urgent());
        wo.priority = Priority::Urgent;
        assert!(wo.is_urgent());
    }

    #[test]
    fn test_overdue_requires_open_status_and_past_delivery() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let open = order(Some(past), None);
        assert!(open.is_overdue(today));

        let mut done = order(Some(past), None);
        done.status = ExecutionStatus::Completed;
        assert!(!done.is_overdue(today));

        assert!(!order(None, None).is_overdue(today));
    }
}
