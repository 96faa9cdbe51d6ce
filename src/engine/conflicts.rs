// ==========================================
// Production Scheduling Engine - conflict detector
// ==========================================
// Runs after the projector. Conflicts are data, never control flow:
// the detector annotates the schedule and the schedule still commits.
//
// - CapacityExceeded (warning): a day inside the scheduling horizon is
//   loaded beyond the work center's daily capacity. A slot's full
//   duration is attributed to the day it starts on; non-working days
//   have zero capacity. The message carries the overage in minutes.
// - UnsatisfiedDependency (info): an operation declares a dependency
//   that has not reached completed. Enumerated per operation; callers
//   running in blocking mode decide whether to refuse execution.
// ==========================================

use crate::domain::operation::SchedCandidate;
use crate::domain::schedule::{ProjectedSlot, ScheduleConflict};
use crate::domain::types::{ConflictKind, OperationId, Severity};
use crate::engine::calendar::is_working_day;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use tracing::instrument;

pub struct ConflictDetector {
    // Stateless engine, no injected dependencies.
}

impl ConflictDetector {
    pub fn new() -> Self {
        Self {}
    }

    /// Full conflict list for one work center schedule.
    #[instrument(skip(self, ordered, slots, completed), fields(count = ordered.len()))]
    pub fn detect(
        &self,
        ordered: &[SchedCandidate],
        slots: &[ProjectedSlot],
        completed: &HashSet<OperationId>,
        daily_capacity_minutes: i64,
        horizon_start: NaiveDate,
        horizon_days: i64,
    ) -> Vec<ScheduleConflict> {
        let mut conflicts = self.detect_capacity(
            slots,
            daily_capacity_minutes,
            horizon_start,
            horizon_days,
        );
        conflicts.extend(self.detect_dependencies(ordered, completed));
        conflicts
    }

    /// Per-day load check across the horizon.
    fn detect_capacity(
        &self,
        slots: &[ProjectedSlot],
        daily_capacity_minutes: i64,
        horizon_start: NaiveDate,
        horizon_days: i64,
    ) -> Vec<ScheduleConflict> {
        let horizon_end = horizon_start + Duration::days(horizon_days.max(1) - 1);

        // BTreeMap keeps the reported days in chronological order.
        let mut load_by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for slot in slots {
            let day = slot.estimated_start.date_naive();
            if day < horizon_start || day > horizon_end {
                continue;
            }
            let minutes = (slot.estimated_end - slot.estimated_start).num_minutes();
            *load_by_day.entry(day).or_insert(0) += minutes;
        }

        load_by_day
            .into_iter()
            .filter_map(|(day, planned)| {
                let available = if is_working_day(day) {
                    daily_capacity_minutes
                } else {
                    0
                };
                if planned <= available {
                    return None;
                }
                Some(ScheduleConflict {
                    kind: ConflictKind::CapacityExceeded,
                    severity: Severity::Warning,
                    message: format!(
                        "capacity exceeded on {}: planned {} min against {} min available (overage {} min)",
                        day,
                        planned,
                        available,
                        planned - available
                    ),
                    operation_id: None,
                })
            })
            .collect()
    }

    /// One info conflict per operation with unmet dependencies.
    fn detect_dependencies(
        &self,
        ordered: &[SchedCandidate],
        completed: &HashSet<OperationId>,
    ) -> Vec<ScheduleConflict> {
        ordered
            .iter()
            .filter_map(|candidate| {
                let unmet: Vec<OperationId> = candidate
                    .operation
                    .dependencies
                    .iter()
                    .copied()
                    .filter(|dep| !completed.contains(dep))
                    .collect();
                if unmet.is_empty() {
                    return None;
                }
                Some(ScheduleConflict {
                    kind: ConflictKind::UnsatisfiedDependency,
                    severity: Severity::Info,
                    message: format!(
                        "operation {} depends on uncompleted operations {:?}",
                        candidate.operation.id, unmet
                    ),
                    operation_id: Some(candidate.operation.id),
                })
            })
            .collect()
    }
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new()
    }
}
