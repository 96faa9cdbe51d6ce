// ==========================================
// Production Scheduling Engine - schedule orchestrator
// ==========================================
// Wires the pipeline for one work center:
//
//   load pending -> Sequencer -> commit sequence -> TimelineProjector
//   -> commit projection -> ConflictDetector
//
// Ordering fails before anything is committed; the sequence commit
// itself is atomic in the repository, so two competing runs cannot
// interleave into a torn renumbering. Each run carries a uuid that is
// logged at every commit point.
// ==========================================

use crate::domain::operation::SchedCandidate;
use crate::domain::schedule::{OptimizationResult, ScheduleEntry};
use crate::domain::types::{OperationId, OptimizeCriterion, WorkOrderId};
use crate::domain::work_center::WorkCenter;
use crate::engine::conflicts::ConflictDetector;
use crate::engine::error::SchedulingResult;
use crate::engine::projector::TimelineProjector;
use crate::engine::sequencer::Sequencer;
use crate::repository::operation_repo::OperationRepository;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};
use uuid::Uuid;

/// Default scheduling horizon in calendar days.
pub const DEFAULT_HORIZON_DAYS: i64 = 7;

pub struct ScheduleOrchestrator {
    operations: OperationRepository,
    sequencer: Sequencer,
    projector: TimelineProjector,
    detector: ConflictDetector,
    horizon_days: i64,
}

impl ScheduleOrchestrator {
    pub fn new(conn: Arc<Mutex<Connection>>, horizon_days: i64) -> Self {
        Self {
            operations: OperationRepository::from_connection(conn),
            sequencer: Sequencer::new(),
            projector: TimelineProjector::new(),
            detector: ConflictDetector::new(),
            horizon_days: horizon_days.max(1),
        }
    }

    /// Re-sequence, project, and annotate the pending queue of one
    /// work center. The committed order becomes the stored sequence.
    #[instrument(skip(self, work_center, criterion), fields(code = %work_center.code))]
    pub fn optimize(
        &self,
        work_center: &WorkCenter,
        criterion: &OptimizeCriterion,
        order_filter: Option<&[WorkOrderId]>,
        anchor: Option<DateTime<Utc>>,
    ) -> SchedulingResult<OptimizationResult> {
        let run_id = Uuid::new_v4();
        let anchor = anchor.unwrap_or_else(Utc::now);

        let candidates = self
            .operations
            .load_pending_for_work_center(work_center.id, order_filter)?;
        let ordered = self.sequencer.order(candidates, criterion)?;

        let ordered_ids: Vec<OperationId> = ordered.iter().map(|c| c.operation.id).collect();
        // A filtered run renumbers only the filtered subset and must
        // not claim to replace the whole queue.
        if order_filter.is_none() {
            self.operations.commit_sequence(work_center.id, &ordered_ids)?;
            info!(%run_id, code = %work_center.code, count = ordered_ids.len(), "sequence committed");
        }

        let projection =
            self.projector
                .project(&ordered, anchor, work_center.setup_time_minutes);
        self.operations.commit_projection(&projection.slots)?;
        info!(%run_id, code = %work_center.code, "projection committed");

        let declared: Vec<OperationId> = ordered
            .iter()
            .flat_map(|c| c.operation.dependencies.iter().copied())
            .collect();
        let completed = self.operations.completed_ids(&declared)?;
        let conflicts = self.detector.detect(
            &ordered,
            &projection.slots,
            &completed,
            work_center.daily_capacity_minutes(),
            anchor.date_naive(),
            self.horizon_days,
        );

        let entries = build_entries(&ordered, &projection.slots);
        Ok(OptimizationResult {
            run_id,
            work_center_code: work_center.code.clone(),
            entries,
            conflicts,
            estimated_completion: projection.completion(),
            warnings: projection.warnings,
        })
    }

    /// Apply an operator-supplied explicit order. Validation and the
    /// atomic sequence commit are shared with optimize.
    pub fn reorder(
        &self,
        work_center: &WorkCenter,
        explicit_order: Vec<OperationId>,
        anchor: Option<DateTime<Utc>>,
    ) -> SchedulingResult<OptimizationResult> {
        self.optimize(
            work_center,
            &OptimizeCriterion::CustomOrder(explicit_order),
            None,
            anchor,
        )
    }

    /// The live queue (pending + in_progress) in stored order, without
    /// re-sequencing anything.
    pub fn current_schedule(&self, work_center: &WorkCenter) -> SchedulingResult<Vec<ScheduleEntry>> {
        let queue = self.operations.load_queue(work_center.id)?;
        Ok(queue
            .iter()
            .enumerate()
            .map(|(index, candidate)| entry_from(candidate, (index + 1) as i64))
            .collect())
    }
}

fn entry_from(candidate: &SchedCandidate, sequence_order: i64) -> ScheduleEntry {
    ScheduleEntry {
        operation_id: candidate.operation.id,
        work_order_id: candidate.operation.work_order_id,
        work_order_reference: candidate.work_order_reference.clone(),
        operation_name: candidate.operation.name.clone(),
        standard_time: candidate.operation.standard_time,
        sequence_order,
        estimated_start: candidate.operation.estimated_start,
        estimated_end: candidate.operation.estimated_end,
    }
}

fn build_entries(
    ordered: &[SchedCandidate],
    slots: &[crate::domain::schedule::ProjectedSlot],
) -> Vec<ScheduleEntry> {
    ordered
        .iter()
        .zip(slots)
        .enumerate()
        .map(|(index, (candidate, slot))| {
            let mut entry = entry_from(candidate, (index + 1) as i64);
            entry.estimated_start = Some(slot.estimated_start);
            entry.estimated_end = Some(slot.estimated_end);
            entry
        })
        .collect()
}
