// ==========================================
// Production Scheduling Engine - sequencer
// ==========================================
// Orders the pending operations of one work center by an
// interchangeable criterion. Pure: the caller commits the result
// through the storage boundary.
//
// Rules:
// - date criteria sort ascending with nulls last; operations whose
//   order lacks the date keep their original relative order
// - all non-custom criteria are stable, so re-running on unchanged
//   data returns an identical order
// - the custom criterion must be an exact permutation of the pending
//   set; any mismatch fails before anything is committed
// ==========================================

use crate::domain::operation::SchedCandidate;
use crate::domain::types::{OperationId, OptimizeCriterion};
use crate::engine::error::{SchedulingError, SchedulingResult};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

pub struct Sequencer {
    // Stateless engine, no injected dependencies.
}

impl Sequencer {
    pub fn new() -> Self {
        Self {}
    }

    /// Produce a total order over the given candidates.
    ///
    /// The input is expected in stored-sequence order; stability of the
    /// sort is what preserves that order among equal keys.
    #[instrument(skip(self, candidates), fields(criterion = %criterion, count = candidates.len()))]
    pub fn order(
        &self,
        mut candidates: Vec<SchedCandidate>,
        criterion: &OptimizeCriterion,
    ) -> SchedulingResult<Vec<SchedCandidate>> {
        match criterion {
            OptimizeCriterion::ByDeliveryDate => {
                candidates.sort_by(|a, b| cmp_nulls_last(a.delivery_date, b.delivery_date));
                Ok(candidates)
            }
            OptimizeCriterion::ByAssemblyDate => {
                candidates.sort_by(|a, b| cmp_nulls_last(a.assembly_date, b.assembly_date));
                Ok(candidates)
            }
            OptimizeCriterion::ByTertiaryDate => {
                candidates.sort_by(|a, b| cmp_nulls_last(a.tertiary_date, b.tertiary_date));
                Ok(candidates)
            }
            OptimizeCriterion::ByUrgency => {
                candidates.sort_by(|a, b| {
                    a.priority
                        .cmp(&b.priority)
                        .then_with(|| cmp_nulls_last(a.delivery_date, b.delivery_date))
                });
                Ok(candidates)
            }
            OptimizeCriterion::CustomOrder(explicit) => self.apply_custom(candidates, explicit),
        }
    }

    /// Reorder by a caller-supplied permutation after validating that
    /// it exactly equals the pending set.
    fn apply_custom(
        &self,
        candidates: Vec<SchedCandidate>,
        explicit: &[OperationId],
    ) -> SchedulingResult<Vec<SchedCandidate>> {
        let pending: HashSet<OperationId> = candidates.iter().map(|c| c.operation.id).collect();
        let supplied: HashSet<OperationId> = explicit.iter().copied().collect();

        if supplied.len() != explicit.len() {
            let mut seen = HashSet::new();
            let duplicates: Vec<OperationId> = explicit
                .iter()
                .copied()
                .filter(|id| !seen.insert(*id))
                .collect();
            return Err(SchedulingError::InvalidSequence {
                reason: format!("duplicate operation ids {:?}", duplicates),
            });
        }

        let missing: Vec<OperationId> = pending.difference(&supplied).copied().collect();
        let foreign: Vec<OperationId> = supplied.difference(&pending).copied().collect();
        if !missing.is_empty() || !foreign.is_empty() {
            return Err(SchedulingError::InvalidSequence {
                reason: format!(
                    "supplied order does not match the pending set \
                     (missing {:?}, foreign {:?})",
                    missing, foreign
                ),
            });
        }

        let mut by_id: HashMap<OperationId, SchedCandidate> = candidates
            .into_iter()
            .map(|c| (c.operation.id, c))
            .collect();
        // Membership was validated above, so every id resolves.
        let ordered = explicit
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();
        Ok(ordered)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Ascending date comparison with missing dates after all dated
/// entries. Equal keys compare Equal so the stable sort keeps input
/// order.
fn cmp_nulls_last(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::Operation;
    use crate::domain::types::{ExecutionStatus, Priority, StandardTime};
    use chrono::Utc;

    fn candidate(
        id: OperationId,
        seq: i64,
        priority: Priority,
        delivery: Option<NaiveDate>,
    ) -> SchedCandidate {
        let now = Utc::now();
        SchedCandidate {
            operation: Operation {
                id,
                work_order_id: id,
                work_center_id: 1,
                sequence_number: seq,
                name: format!("OP-{}", id),
                standard_time: StandardTime::Minutes(60),
                quantity_target: Some(1),
                quantity_completed: 0,
                status: ExecutionStatus::Pending,
                dependencies: vec![],
                estimated_start: None,
                estimated_end: None,
                actual_start: None,
                actual_end: None,
                created_at: now,
                updated_at: now,
            },
            work_order_reference: format!("RN-{}", id),
            priority,
            delivery_date: delivery,
            assembly_date: None,
            tertiary_date: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(candidates: &[SchedCandidate]) -> Vec<OperationId> {
        candidates.iter().map(|c| c.operation.id).collect()
    }

    #[test]
    fn test_delivery_date_ascending_nulls_last() {
        let sequencer = Sequencer::new();
        let input = vec![
            candidate(1, 1, Priority::Normal, Some(date(2024, 1, 10))),
            candidate(2, 2, Priority::Normal, Some(date(2024, 1, 5))),
            candidate(3, 3, Priority::Normal, None),
        ];
        let ordered = sequencer
            .order(input, &OptimizeCriterion::ByDeliveryDate)
            .unwrap();
        assert_eq!(ids(&ordered), vec![2, 1, 3]);
    }

    #[test]
    fn test_stability_on_equal_dates() {
        let sequencer = Sequencer::new();
        let same = Some(date(2024, 1, 5));
        let input = vec![
            candidate(7, 1, Priority::Normal, same),
            candidate(3, 2, Priority::Normal, same),
            candidate(9, 3, Priority::Normal, same),
        ];
        let ordered = sequencer
            .order(input, &OptimizeCriterion::ByDeliveryDate)
            .unwrap();
        assert_eq!(ids(&ordered), vec![7, 3, 9]);
    }

    #[test]
    fn test_idempotent_on_reapplication() {
        let sequencer = Sequencer::new();
        let input = vec![
            candidate(1, 1, Priority::Normal, Some(date(2024, 3, 1))),
            candidate(2, 2, Priority::Normal, None),
            candidate(3, 3, Priority::Normal, Some(date(2024, 2, 1))),
            candidate(4, 4, Priority::Normal, None),
        ];
        let once = sequencer
            .order(input, &OptimizeCriterion::ByDeliveryDate)
            .unwrap();
        let twice = sequencer
            .order(once.clone(), &OptimizeCriterion::ByDeliveryDate)
            .unwrap();
        assert_eq!(ids(&once), ids(&twice));
        // Undated entries keep their original relative order
        assert_eq!(ids(&once), vec![3, 1, 2, 4]);
    }

    #[test]
    fn test_urgency_then_delivery_tie_break() {
        let sequencer = Sequencer::new();
        let input = vec![
            candidate(1, 1, Priority::Normal, Some(date(2024, 1, 2))),
            candidate(2, 2, Priority::Urgent, Some(date(2024, 1, 9))),
            candidate(3, 3, Priority::Urgent, Some(date(2024, 1, 3))),
            candidate(4, 4, Priority::Elevated, None),
        ];
        let ordered = sequencer.order(input, &OptimizeCriterion::ByUrgency).unwrap();
        assert_eq!(ids(&ordered), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_custom_order_applies_permutation() {
        let sequencer = Sequencer::new();
        let input = vec![
            candidate(1, 1, Priority::Normal, None),
            candidate(2, 2, Priority::Normal, None),
            candidate(3, 3, Priority::Normal, None),
        ];
        let ordered = sequencer
            .order(input, &OptimizeCriterion::CustomOrder(vec![3, 1, 2]))
            .unwrap();
        assert_eq!(ids(&ordered), vec![3, 1, 2]);
    }

    #[test]
    fn test_custom_order_rejects_missing_and_foreign_ids() {
        let sequencer = Sequencer::new();
        let input = vec![
            candidate(1, 1, Priority::Normal, None),
            candidate(2, 2, Priority::Normal, None),
        ];
        let err = sequencer
            .order(input, &OptimizeCriterion::CustomOrder(vec![1, 99]))
            .unwrap_err();
        match err {
            SchedulingError::InvalidSequence { reason } => {
                assert!(reason.contains("missing"));
                assert!(reason.contains("foreign"));
            }
            other => panic!("expected InvalidSequence, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_order_rejects_duplicates() {
        let sequencer = Sequencer::new();
        let input = vec![
            candidate(1, 1, Priority::Normal, None),
            candidate(2, 2, Priority::Normal, None),
        ];
        let err = sequencer
            .order(input, &OptimizeCriterion::CustomOrder(vec![1, 1]))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidSequence { .. }));
    }

    #[test]
    fn test_custom_order_rejects_wrong_cardinality() {
        let sequencer = Sequencer::new();
        let input = vec![
            candidate(1, 1, Priority::Normal, None),
            candidate(2, 2, Priority::Normal, None),
        ];
        let err = sequencer
            .order(input, &OptimizeCriterion::CustomOrder(vec![1]))
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidSequence { .. }));
    }
}
