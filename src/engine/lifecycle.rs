// ==========================================
// Production Scheduling Engine - lifecycle controller
// ==========================================
// Owns the status state machine for work orders and operations:
//
//   pending -> in_progress -> completed
//   pending | in_progress -> cancelled
//   cancelled -> pending            (explicit reopen)
//
// completed is terminal. Every write is a compare-and-swap against the
// status read immediately before it; a lost race surfaces StaleState
// with the observed status. Competing identical completions are
// idempotent and both report success.
//
// Completing a work order cascades: every child operation still in
// pending or in_progress is forced to completed, stamping actual_end
// only where absent. Cancelling a work order does NOT cascade; its
// operations stay as they are for an operator to resolve one by one.
// ==========================================

use crate::domain::operation::Operation;
use crate::domain::types::{
    DependencyMode, EntityKind, ExecutionStatus, OperationId, WorkOrderId,
};
use crate::domain::work_order::WorkOrder;
use crate::engine::error::{SchedulingError, SchedulingResult};
use crate::repository::error::RepositoryError;
use crate::repository::operation_repo::OperationRepository;
use crate::repository::work_order_repo::{DeleteOutcome, WorkOrderRepository};
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

/// Legal status edges, shared by both entity kinds.
pub fn transition_allowed(from: ExecutionStatus, to: ExecutionStatus) -> bool {
    use ExecutionStatus::*;
    matches!(
        (from, to),
        (Pending, InProgress)
            | (InProgress, Completed)
            | (Pending, Cancelled)
            | (InProgress, Cancelled)
            | (Cancelled, Pending)
    )
}

pub struct LifecycleController {
    orders: WorkOrderRepository,
    operations: OperationRepository,
    dependency_mode: DependencyMode,
}

impl LifecycleController {
    pub fn new(conn: Arc<Mutex<Connection>>, dependency_mode: DependencyMode) -> Self {
        Self {
            orders: WorkOrderRepository::from_connection(conn.clone()),
            operations: OperationRepository::from_connection(conn),
            dependency_mode,
        }
    }

    /// Transition one operation to `target`.
    ///
    /// In blocking dependency mode, starting an operation whose
    /// dependencies are not all completed is refused.
    #[instrument(skip(self), fields(operation_id = id, target = %target))]
    pub fn transition_operation(
        &self,
        id: OperationId,
        target: ExecutionStatus,
    ) -> SchedulingResult<Operation> {
        let current = self.operations.find_by_id(id)?;

        // A repeat of an already-applied completion is a success, not
        // a stale write.
        if current.status == ExecutionStatus::Completed && target == ExecutionStatus::Completed {
            return Ok(current);
        }
        if !transition_allowed(current.status, target) {
            return Err(SchedulingError::InvalidTransition {
                entity: EntityKind::Operation,
                from: current.status,
                to: target,
            });
        }
        if self.dependency_mode == DependencyMode::Blocking
            && target == ExecutionStatus::InProgress
        {
            self.ensure_dependencies_met(&current)?;
        }

        let now = Utc::now();
        match self.operations.update_status_cas(id, current.status, target, now) {
            Ok(op) => {
                info!(operation_id = id, from = %current.status, to = %target, "operation transitioned");
                Ok(op)
            }
            Err(RepositoryError::StaleState { actual, .. })
                if target == ExecutionStatus::Completed
                    && actual == ExecutionStatus::Completed.to_db_str() =>
            {
                // The competing completion already won; same outcome.
                Ok(self.operations.find_by_id(id)?)
            }
            Err(e) => {
                warn!(operation_id = id, to = %target, error = %e, "operation transition rejected");
                Err(e.into())
            }
        }
    }

    /// Transition one work order to `target`, cascading completion to
    /// its open operations.
    #[instrument(skip(self), fields(work_order_id = id, target = %target))]
    pub fn transition_work_order(
        &self,
        id: WorkOrderId,
        target: ExecutionStatus,
    ) -> SchedulingResult<WorkOrder> {
        let current = self.orders.find_by_id(id)?;

        if current.status == ExecutionStatus::Completed && target == ExecutionStatus::Completed {
            return Ok(current);
        }
        if !transition_allowed(current.status, target) {
            return Err(SchedulingError::InvalidTransition {
                entity: EntityKind::WorkOrder,
                from: current.status,
                to: target,
            });
        }

        let now = Utc::now();
        let order = match self.orders.update_status_cas(id, current.status, target, now) {
            Ok(order) => order,
            Err(RepositoryError::StaleState { actual, .. })
                if target == ExecutionStatus::Completed
                    && actual == ExecutionStatus::Completed.to_db_str() =>
            {
                self.orders.find_by_id(id)?
            }
            Err(e) => {
                warn!(work_order_id = id, to = %target, error = %e, "work order transition rejected");
                return Err(e.into());
            }
        };

        if target == ExecutionStatus::Completed {
            self.cascade_completion(id)?;
        }
        info!(work_order_id = id, from = %current.status, to = %target, "work order transitioned");
        Ok(order)
    }

    /// Delete a work order unless a child operation is running. Orders
    /// with completed history are archived instead of removed.
    #[instrument(skip(self))]
    pub fn delete_work_order(&self, id: WorkOrderId) -> SchedulingResult<DeleteOutcome> {
        let outcome = self.orders.delete_guarded(id)?;
        info!(work_order_id = id, ?outcome, "work order removed");
        Ok(outcome)
    }

    /// Force every pending/in_progress child to completed. Operations
    /// that already carry an actual_end keep it; cancelled children are
    /// left alone.
    fn cascade_completion(&self, work_order_id: WorkOrderId) -> SchedulingResult<()> {
        let now = Utc::now();
        for op in self.operations.find_by_work_order(work_order_id)? {
            let mut observed = op.status;
            // Bounded retry: a child may be transitioned concurrently
            // while the cascade runs.
            for _ in 0..3 {
                if observed.is_terminal() || observed == ExecutionStatus::Cancelled {
                    break;
                }
                match self.operations.update_status_cas(
                    op.id,
                    observed,
                    ExecutionStatus::Completed,
                    now,
                ) {
                    Ok(_) => {
                        info!(operation_id = op.id, "operation completed by cascade");
                        break;
                    }
                    Err(RepositoryError::StaleState { actual, .. }) => {
                        observed = ExecutionStatus::from_db_str(&actual)
                            .unwrap_or(ExecutionStatus::Completed);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(())
    }

    fn ensure_dependencies_met(&self, op: &Operation) -> SchedulingResult<()> {
        if op.dependencies.is_empty() {
            return Ok(());
        }
        let completed = self.operations.completed_ids(&op.dependencies)?;
        let unmet: Vec<OperationId> = op
            .dependencies
            .iter()
            .copied()
            .filter(|dep| !completed.contains(dep))
            .collect();
        if unmet.is_empty() {
            Ok(())
        } else {
            Err(SchedulingError::DependenciesUnsatisfied {
                operation_id: op.id,
                unmet,
            })
        }
    }
}
