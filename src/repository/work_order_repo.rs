// ==========================================
// Production Scheduling Engine - work order repository
// ==========================================
// Work orders and their operations form one composition: they are
// created together and an operation never outlives (or changes) its
// order. Deletion rules live here because they are storage-atomic.
// ==========================================

use crate::domain::types::{ExecutionStatus, Priority, WorkOrderId};
use crate::domain::work_order::WorkOrder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::operation_repo::NewOperation;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// Insert payload for a work order.
#[derive(Debug, Clone)]
pub struct NewWorkOrder {
    pub reference_number: String,
    pub product_id: i64,
    pub quantity: i64,
    pub priority: Priority,
    pub delivery_date: Option<NaiveDate>,
    pub assembly_date: Option<NaiveDate>,
    pub tertiary_date: Option<NaiveDate>,
}

/// Outcome of a guarded delete. Orders with completed history are
/// archived, never hard-deleted, so capacity reporting keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Archived,
}

pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

const ORDER_COLS: &str = "id, reference_number, product_id, quantity, priority_level, \
     delivery_date, assembly_date, tertiary_date, status, archived, created_at, updated_at";

fn map_order_row(row: &Row<'_>) -> rusqlite::Result<(WorkOrder, String, i64)> {
    let order = WorkOrder {
        id: row.get(0)?,
        reference_number: row.get(1)?,
        product_id: row.get(2)?,
        quantity: row.get(3)?,
        priority: Priority::Normal,
        delivery_date: row.get(5)?,
        assembly_date: row.get(6)?,
        tertiary_date: row.get(7)?,
        status: ExecutionStatus::Pending,
        archived: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    };
    let status_raw: String = row.get(8)?;
    let priority_level: i64 = row.get(4)?;
    Ok((order, status_raw, priority_level))
}

fn finish_order(
    (mut order, status_raw, priority_level): (WorkOrder, String, i64),
) -> RepositoryResult<WorkOrder> {
    order.status =
        ExecutionStatus::from_db_str(&status_raw).ok_or_else(|| RepositoryError::FieldValueError {
            field: "status".to_string(),
            message: format!("unknown status '{}'", status_raw),
        })?;
    order.priority =
        Priority::from_level(priority_level).ok_or_else(|| RepositoryError::FieldValueError {
            field: "priority_level".to_string(),
            message: format!("unknown priority level {}", priority_level),
        })?;
    Ok(order)
}

impl WorkOrderRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Create a work order together with its operations, in one
    /// transaction. An order with zero operations is valid; it simply
    /// produces no schedulable work.
    pub fn insert_with_operations(
        &self,
        new: NewWorkOrder,
        operations: Vec<NewOperation>,
    ) -> RepositoryResult<WorkOrder> {
        if new.quantity <= 0 {
            return Err(RepositoryError::FieldValueError {
                field: "quantity".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let id = {
            let mut conn = self.get_conn()?;
            let tx = conn
                .transaction()
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
            let now = Utc::now();
            tx.execute(
                "INSERT INTO work_orders \
                     (reference_number, product_id, quantity, priority_level, delivery_date, \
                      assembly_date, tertiary_date, status, archived, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'pending', 0, ?8, ?8)",
                params![
                    new.reference_number,
                    new.product_id,
                    new.quantity,
                    new.priority.level(),
                    new.delivery_date,
                    new.assembly_date,
                    new.tertiary_date,
                    now,
                ],
            )?;
            let order_id = tx.last_insert_rowid();

            for op in &operations {
                let deps = serde_json::to_string(&op.dependencies)
                    .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
                tx.execute(
                    "INSERT INTO operations \
                         (work_order_id, work_center_id, sequence_number, name, \
                          standard_time_minutes, quantity_target, quantity_completed, status, \
                          dependencies, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 'pending', ?7, ?8, ?8)",
                    params![
                        order_id,
                        op.work_center_id,
                        op.sequence_number,
                        op.name,
                        op.standard_time.to_db(),
                        op.quantity_target,
                        deps,
                        now,
                    ],
                )?;
            }

            tx.commit()
                .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
            order_id
        };
        self.find_by_id(id)
    }

    pub fn find_by_id(&self, id: WorkOrderId) -> RepositoryResult<WorkOrder> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM work_orders WHERE id = ?1", ORDER_COLS);
        let raw = conn
            .query_row(&sql, params![id], map_order_row)
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                id: id.to_string(),
            })?;
        finish_order(raw)
    }

    pub fn find_by_reference(&self, reference: &str) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM work_orders WHERE reference_number = ?1",
            ORDER_COLS
        );
        match conn
            .query_row(&sql, params![reference], map_order_row)
            .optional()?
        {
            Some(raw) => Ok(Some(finish_order(raw)?)),
            None => Ok(None),
        }
    }

    /// Compare-and-swap status transition (same discipline as the
    /// operation repository; orders carry no actual timestamps).
    pub fn update_status_cas(
        &self,
        id: WorkOrderId,
        expected: ExecutionStatus,
        target: ExecutionStatus,
        now: DateTime<Utc>,
    ) -> RepositoryResult<WorkOrder> {
        let updated = {
            let conn = self.get_conn()?;
            conn.execute(
                "UPDATE work_orders SET status = ?1, updated_at = ?2 \
                 WHERE id = ?3 AND status = ?4",
                params![target.to_db_str(), now, id, expected.to_db_str()],
            )?
        };
        if updated == 0 {
            let current = self.find_by_id(id)?;
            return Err(RepositoryError::StaleState {
                entity: "WorkOrder".to_string(),
                id,
                expected: expected.to_db_str().to_string(),
                actual: current.status.to_db_str().to_string(),
            });
        }
        self.find_by_id(id)
    }

    /// All-or-nothing guarded delete.
    ///
    /// Fails with Conflict while any child operation is in_progress.
    /// If any child ever completed the order is archived instead of
    /// deleted; otherwise the order and its operations are removed
    /// (FK cascade) in one transaction.
    pub fn delete_guarded(&self, id: WorkOrderId) -> RepositoryResult<DeleteOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM work_orders WHERE id = ?1",
                params![id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                id: id.to_string(),
            });
        }

        let in_progress: i64 = tx.query_row(
            "SELECT COUNT(*) FROM operations WHERE work_order_id = ?1 AND status = 'in_progress'",
            params![id],
            |row| row.get(0),
        )?;
        if in_progress > 0 {
            return Err(RepositoryError::Conflict(format!(
                "work order {} has {} operation(s) in progress; nothing was deleted",
                id, in_progress
            )));
        }

        let completed: i64 = tx.query_row(
            "SELECT COUNT(*) FROM operations WHERE work_order_id = ?1 AND status = 'completed'",
            params![id],
            |row| row.get(0),
        )?;

        let outcome = if completed > 0 {
            tx.execute(
                "UPDATE work_orders SET archived = 1, updated_at = ?1 WHERE id = ?2",
                params![Utc::now(), id],
            )?;
            DeleteOutcome::Archived
        } else {
            tx.execute("DELETE FROM work_orders WHERE id = ?1", params![id])?;
            DeleteOutcome::Deleted
        };

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(outcome)
    }

    /// Open orders whose delivery date has passed.
    pub fn find_overdue(&self, today: NaiveDate) -> RepositoryResult<Vec<WorkOrder>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM work_orders \
             WHERE delivery_date IS NOT NULL AND delivery_date < ?1 \
               AND status NOT IN ('completed', 'cancelled') AND archived = 0 \
             ORDER BY delivery_date",
            ORDER_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![today], map_order_row)?;
        let mut orders = Vec::new();
        for row in rows {
            orders.push(finish_order(row?)?);
        }
        Ok(orders)
    }
}
