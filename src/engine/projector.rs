// ==========================================
// Production Scheduling Engine - timeline projector
// ==========================================
// Serial single-resource projection: a work center runs one operation
// at a time, no preemption. Each slot starts where the previous one
// ended; the first starts at the supplied anchor instant.
//
// duration_i = setup_minutes + standard_minutes_i. An unestimated
// operation contributes zero standard minutes and is flagged with a
// warning so the caller does not mistake the slot for a real estimate.
//
// Output is advisory: the repository writes it to estimated_start and
// estimated_end only, never to the actual timestamps. For the same
// ordered input and anchor the projection is bit-identical.
// ==========================================

use crate::domain::operation::SchedCandidate;
use crate::domain::schedule::{ProjectedSlot, ProjectionWarning};
use crate::domain::types::StandardTime;
use chrono::{DateTime, Duration, Utc};
use tracing::instrument;

pub struct TimelineProjector {
    // Stateless engine, no injected dependencies.
}

/// A computed projection plus its non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub slots: Vec<ProjectedSlot>,
    pub warnings: Vec<ProjectionWarning>,
}

impl Projection {
    /// End of the last slot, when anything was projected.
    pub fn completion(&self) -> Option<DateTime<Utc>> {
        self.slots.last().map(|s| s.estimated_end)
    }

    /// Sum of projected durations in minutes.
    pub fn total_minutes(&self) -> i64 {
        self.slots
            .iter()
            .map(|s| (s.estimated_end - s.estimated_start).num_minutes())
            .sum()
    }
}

impl TimelineProjector {
    pub fn new() -> Self {
        Self {}
    }

    #[instrument(skip(self, ordered), fields(count = ordered.len(), setup = setup_minutes))]
    pub fn project(
        &self,
        ordered: &[SchedCandidate],
        anchor: DateTime<Utc>,
        setup_minutes: i64,
    ) -> Projection {
        let mut slots = Vec::with_capacity(ordered.len());
        let mut warnings = Vec::new();
        let mut cursor = anchor;

        for candidate in ordered {
            let standard = match candidate.operation.standard_time {
                StandardTime::Minutes(m) => m,
                StandardTime::Unestimated => {
                    warnings.push(ProjectionWarning::UnestimatedOperation {
                        operation_id: candidate.operation.id,
                    });
                    0
                }
            };
            let end = cursor + Duration::minutes(setup_minutes + standard);
            slots.push(ProjectedSlot {
                operation_id: candidate.operation.id,
                estimated_start: cursor,
                estimated_end: end,
            });
            cursor = end;
        }

        Projection { slots, warnings }
    }
}

impl Default for TimelineProjector {
    fn default() -> Self {
        Self::new()
    }
}
