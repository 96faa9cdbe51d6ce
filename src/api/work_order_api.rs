// ==========================================
// Production Scheduling Engine - work order API
// ==========================================
// Facade over work order life: creation with routing operations,
// status transitions (through the lifecycle controller), guarded
// deletion, progress updates, and overdue lookup.
// ==========================================

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::operation::Operation;
use crate::domain::types::{EntityKind, ExecutionStatus, OperationId, WorkOrderId};
use crate::domain::work_order::WorkOrder;
use crate::engine::lifecycle::LifecycleController;
use crate::repository::operation_repo::{NewOperation, OperationRepository};
use crate::repository::work_order_repo::{DeleteOutcome, NewWorkOrder, WorkOrderRepository};
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{instrument, warn};

/// Creation outcome. The advisory is a human-readable note about
/// suspicious target dates (delivery before assembly); it never blocks
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedWorkOrder {
    pub work_order: WorkOrder,
    pub advisory: Option<String>,
}

/// New state after a status transition, per entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum TransitionOutcome {
    WorkOrder(WorkOrder),
    Operation(Operation),
}

pub struct WorkOrderApi {
    conn: Arc<Mutex<Connection>>,
    orders: WorkOrderRepository,
    operations: OperationRepository,
    config: ConfigManager,
}

impl WorkOrderApi {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            orders: WorkOrderRepository::from_connection(conn.clone()),
            operations: OperationRepository::from_connection(conn.clone()),
            config: ConfigManager::from_connection(conn.clone()),
            conn,
        }
    }

    fn lifecycle(&self) -> ApiResult<LifecycleController> {
        let cfg = self.config.load_scheduling_config()?;
        Ok(LifecycleController::new(
            self.conn.clone(),
            cfg.dependency_enforcement,
        ))
    }

    /// Create a work order together with its routing operations.
    #[instrument(skip(self, new, operations), fields(reference = %new.reference_number))]
    pub fn create_work_order(
        &self,
        new: NewWorkOrder,
        operations: Vec<NewOperation>,
    ) -> ApiResult<CreatedWorkOrder> {
        let work_order = self.orders.insert_with_operations(new, operations)?;
        let advisory = work_order.date_advisory();
        if let Some(note) = &advisory {
            warn!(reference = %work_order.reference_number, note = %note, "work order created with date advisory");
        }
        Ok(CreatedWorkOrder {
            work_order,
            advisory,
        })
    }

    pub fn get_work_order(&self, id: WorkOrderId) -> ApiResult<(WorkOrder, Vec<Operation>)> {
        let order = self.orders.find_by_id(id)?;
        let operations = self.operations.find_by_work_order(id)?;
        Ok((order, operations))
    }

    /// Transition either entity kind to a target status. The lifecycle
    /// controller enforces the state machine and the cascade rules.
    #[instrument(skip(self), fields(entity = %entity, entity_id = id, target = %target))]
    pub fn transition_status(
        &self,
        entity: EntityKind,
        id: i64,
        target: ExecutionStatus,
    ) -> ApiResult<TransitionOutcome> {
        let lifecycle = self.lifecycle()?;
        match entity {
            EntityKind::WorkOrder => Ok(TransitionOutcome::WorkOrder(
                lifecycle.transition_work_order(id, target)?,
            )),
            EntityKind::Operation => Ok(TransitionOutcome::Operation(
                lifecycle.transition_operation(id, target)?,
            )),
        }
    }

    /// Guarded delete; archives instead when completed history exists.
    pub fn delete_work_order(&self, id: WorkOrderId) -> ApiResult<DeleteOutcome> {
        Ok(self.lifecycle()?.delete_work_order(id)?)
    }

    /// Record produced quantity against an operation; the counter
    /// never goes backwards.
    pub fn update_operation_progress(
        &self,
        id: OperationId,
        quantity_completed: i64,
    ) -> ApiResult<Operation> {
        self.operations.record_progress(id, quantity_completed)?;
        Ok(self.operations.find_by_id(id)?)
    }

    /// Open orders whose delivery date has passed.
    pub fn find_overdue(&self) -> ApiResult<Vec<WorkOrder>> {
        Ok(self.orders.find_overdue(Utc::now().date_naive())?)
    }
}
