// ==========================================
// Production Scheduling Engine - operation repository
// ==========================================
// Owns the three commit paths the engines rely on:
// - commit_sequence: the ONLY bulk sequence_number writer, atomic
// - commit_projection: batched estimated_start/end writes, never
//   touches actual timestamps
// - update_status_cas: compare-and-swap status transition
// ==========================================

use crate::domain::operation::{Operation, SchedCandidate};
use crate::domain::schedule::ProjectedSlot;
use crate::domain::types::{ExecutionStatus, OperationId, Priority, StandardTime, WorkCenterId,
    WorkOrderId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Insert payload for an operation (created together with its order).
#[derive(Debug, Clone)]
pub struct NewOperation {
    pub work_center_id: WorkCenterId,
    pub sequence_number: i64,
    pub name: String,
    pub standard_time: StandardTime,
    pub quantity_target: Option<i64>,
    pub dependencies: Vec<OperationId>,
}

pub struct OperationRepository {
    conn: Arc<Mutex<Connection>>,
}

const OPERATION_COLS: &str = "id, work_order_id, work_center_id, sequence_number, name, \
     standard_time_minutes, quantity_target, quantity_completed, status, dependencies, \
     estimated_start, estimated_end, actual_start, actual_end, created_at, updated_at";

fn parse_status(raw: &str) -> Result<ExecutionStatus, RepositoryError> {
    ExecutionStatus::from_db_str(raw).ok_or_else(|| RepositoryError::FieldValueError {
        field: "status".to_string(),
        message: format!("unknown status '{}'", raw),
    })
}

fn parse_dependencies(raw: &str) -> Result<Vec<OperationId>, RepositoryError> {
    serde_json::from_str(raw).map_err(|e| RepositoryError::FieldValueError {
        field: "dependencies".to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn map_operation_row(row: &Row<'_>) -> rusqlite::Result<(Operation, String, String)> {
    // Status and dependencies come back raw; parsing happens outside
    // the rusqlite closure so errors keep their own type.
    let standard_time: Option<i64> = row.get(5)?;
    let op = Operation {
        id: row.get(0)?,
        work_order_id: row.get(1)?,
        work_center_id: row.get(2)?,
        sequence_number: row.get(3)?,
        name: row.get(4)?,
        standard_time: StandardTime::from(standard_time),
        quantity_target: row.get(6)?,
        quantity_completed: row.get(7)?,
        status: ExecutionStatus::Pending,
        dependencies: Vec::new(),
        estimated_start: row.get(10)?,
        estimated_end: row.get(11)?,
        actual_start: row.get(12)?,
        actual_end: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    };
    let status_raw: String = row.get(8)?;
    let deps_raw: String = row.get(9)?;
    Ok((op, status_raw, deps_raw))
}

fn finish_operation(
    (mut op, status_raw, deps_raw): (Operation, String, String),
) -> RepositoryResult<Operation> {
    op.status = parse_status(&status_raw)?;
    op.dependencies = parse_dependencies(&deps_raw)?;
    Ok(op)
}

impl OperationRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, id: OperationId) -> RepositoryResult<Operation> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM operations WHERE id = ?1", OPERATION_COLS);
        let raw = conn
            .query_row(&sql, params![id], map_operation_row)
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Operation".to_string(),
                id: id.to_string(),
            })?;
        finish_operation(raw)
    }

    pub fn find_by_work_order(&self, work_order_id: WorkOrderId) -> RepositoryResult<Vec<Operation>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM operations WHERE work_order_id = ?1 ORDER BY sequence_number, id",
            OPERATION_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![work_order_id], map_operation_row)?;
        let mut ops = Vec::new();
        for row in rows {
            ops.push(finish_operation(row?)?);
        }
        Ok(ops)
    }

    /// Pending operations for one work center, joined with the parent
    /// order attributes the sequencer's criteria need. Base order is
    /// the stored sequence (then id), which keeps stable sorts
    /// reproducible across runs.
    pub fn load_pending_for_work_center(
        &self,
        work_center_id: WorkCenterId,
        order_filter: Option<&[WorkOrderId]>,
    ) -> RepositoryResult<Vec<SchedCandidate>> {
        let conn = self.get_conn()?;
        let mut sql = format!(
            "SELECT {}, wo.reference_number, wo.priority_level, wo.delivery_date, \
                 wo.assembly_date, wo.tertiary_date \
             FROM operations o \
             JOIN work_orders wo ON wo.id = o.work_order_id \
             WHERE o.work_center_id = ?1 AND o.status = 'pending'",
            OPERATION_COLS
                .split(", ")
                .map(|c| format!("o.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        if let Some(ids) = order_filter {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            let placeholders = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
            sql.push_str(&format!(" AND o.work_order_id IN ({})", placeholders));
        }
        sql.push_str(" ORDER BY o.sequence_number, o.id");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![work_center_id], |row| {
            let raw = map_operation_row(row)?;
            let reference: String = row.get(16)?;
            let priority_level: i64 = row.get(17)?;
            let delivery_date = row.get(18)?;
            let assembly_date = row.get(19)?;
            let tertiary_date = row.get(20)?;
            Ok((raw, reference, priority_level, delivery_date, assembly_date, tertiary_date))
        })?;

        let mut candidates = Vec::new();
        for row in rows {
            let (raw, reference, priority_level, delivery_date, assembly_date, tertiary_date) =
                row?;
            let operation = finish_operation(raw)?;
            let priority =
                Priority::from_level(priority_level).ok_or_else(|| RepositoryError::FieldValueError {
                    field: "priority_level".to_string(),
                    message: format!("unknown priority level {}", priority_level),
                })?;
            candidates.push(SchedCandidate {
                operation,
                work_order_reference: reference,
                priority,
                delivery_date,
                assembly_date,
                tertiary_date,
            });
        }
        Ok(candidates)
    }

    /// The live queue (pending + in_progress) in committed order.
    pub fn load_queue(&self, work_center_id: WorkCenterId) -> RepositoryResult<Vec<SchedCandidate>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {}, wo.reference_number, wo.priority_level, wo.delivery_date, \
                 wo.assembly_date, wo.tertiary_date \
             FROM operations o \
             JOIN work_orders wo ON wo.id = o.work_order_id \
             WHERE o.work_center_id = ?1 AND o.status IN ('pending', 'in_progress') \
             ORDER BY o.sequence_number, o.id",
            OPERATION_COLS
                .split(", ")
                .map(|c| format!("o.{}", c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![work_center_id], |row| {
            let raw = map_operation_row(row)?;
            let reference: String = row.get(16)?;
            let priority_level: i64 = row.get(17)?;
            let delivery_date = row.get(18)?;
            let assembly_date = row.get(19)?;
            let tertiary_date = row.get(20)?;
            Ok((raw, reference, priority_level, delivery_date, assembly_date, tertiary_date))
        })?;
        let mut candidates = Vec::new();
        for row in rows {
            let (raw, reference, priority_level, delivery_date, assembly_date, tertiary_date) =
                row?;
            let operation = finish_operation(raw)?;
            let priority =
                Priority::from_level(priority_level).ok_or_else(|| RepositoryError::FieldValueError {
                    field: "priority_level".to_string(),
                    message: format!("unknown priority level {}", priority_level),
                })?;
            candidates.push(SchedCandidate {
                operation,
                work_order_reference: reference,
                priority,
                delivery_date,
                assembly_date,
                tertiary_date,
            });
        }
        Ok(candidates)
    }

    /// Atomically replace the ordering for one work center.
    ///
    /// The ordered id list must exactly equal the pending set at commit
    /// time; the check runs inside the transaction so two competing
    /// re-sequences cannot interleave into a torn, partially-renumbered
    /// state. Sequence numbers are rewritten 1-based and contiguous.
    pub fn commit_sequence(
        &self,
        work_center_id: WorkCenterId,
        ordered_ids: &[OperationId],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let pending: HashSet<OperationId> = {
            let mut stmt = tx.prepare(
                "SELECT id FROM operations WHERE work_center_id = ?1 AND status = 'pending'",
            )?;
            let rows = stmt.query_map(params![work_center_id], |row| row.get(0))?;
            let mut set = HashSet::new();
            for row in rows {
                set.insert(row?);
            }
            set
        };

        let supplied: HashSet<OperationId> = ordered_ids.iter().copied().collect();
        if supplied.len() != ordered_ids.len() || supplied != pending {
            return Err(RepositoryError::Conflict(format!(
                "sequence commit rejected: supplied set ({} ids) does not match the \
                 pending set ({} ids) for work center {}",
                ordered_ids.len(),
                pending.len(),
                work_center_id
            )));
        }

        let now = Utc::now();
        for (index, operation_id) in ordered_ids.iter().enumerate() {
            tx.execute(
                "UPDATE operations SET sequence_number = ?1, updated_at = ?2 WHERE id = ?3",
                params![(index + 1) as i64, now, operation_id],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Batched write of projected instants. Estimated fields only;
    /// actual_start/actual_end are out of reach by construction.
    pub fn commit_projection(&self, slots: &[ProjectedSlot]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let now = Utc::now();
        for slot in slots {
            tx.execute(
                "UPDATE operations SET estimated_start = ?1, estimated_end = ?2, updated_at = ?3 \
                 WHERE id = ?4",
                params![slot.estimated_start, slot.estimated_end, now, slot.operation_id],
            )?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// Compare-and-swap status transition.
    ///
    /// The write applies only while the stored status still equals
    /// `expected`; a lost race surfaces `StaleState` carrying the
    /// observed status. Timestamp stamping: entering in_progress sets
    /// actual_start if absent; entering completed sets actual_end if
    /// absent. Existing actual timestamps are never overwritten.
    pub fn update_status_cas(
        &self,
        id: OperationId,
        expected: ExecutionStatus,
        target: ExecutionStatus,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Operation> {
        let updated = {
            let conn = self.get_conn()?;
            match target {
                ExecutionStatus::InProgress => conn.execute(
                    "UPDATE operations SET status = ?1, \
                         actual_start = COALESCE(actual_start, ?2), updated_at = ?2 \
                     WHERE id = ?3 AND status = ?4",
                    params![target.to_db_str(), now, id, expected.to_db_str()],
                )?,
                ExecutionStatus::Completed => conn.execute(
                    "UPDATE operations SET status = ?1, \
                         actual_end = COALESCE(actual_end, ?2), updated_at = ?2 \
                     WHERE id = ?3 AND status = ?4",
                    params![target.to_db_str(), now, id, expected.to_db_str()],
                )?,
                ExecutionStatus::Pending | ExecutionStatus::Cancelled => conn.execute(
                    "UPDATE operations SET status = ?1, updated_at = ?2 \
                     WHERE id = ?3 AND status = ?4",
                    params![target.to_db_str(), now, id, expected.to_db_str()],
                )?,
            }
        };

        if updated == 0 {
            let current = self.find_by_id(id)?;
            return Err(RepositoryError::StaleState {
                entity: "Operation".to_string(),
                id,
                expected: expected.to_db_str().to_string(),
                actual: current.status.to_db_str().to_string(),
            });
        }
        self.find_by_id(id)
    }

    /// Monotonic progress update; quantity_completed never decreases.
    pub fn record_progress(&self, id: OperationId, quantity_completed: i64) -> RepositoryResult<()> {
        let current = self.find_by_id(id)?;
        if quantity_completed < current.quantity_completed {
            return Err(RepositoryError::FieldValueError {
                field: "quantity_completed".to_string(),
                message: format!(
                    "must not decrease (current {}, supplied {})",
                    current.quantity_completed, quantity_completed
                ),
            });
        }
        let conn = self.get_conn()?;
        conn.execute(
            "UPDATE operations SET quantity_completed = ?1, updated_at = ?2 WHERE id = ?3",
            params![quantity_completed, Utc::now(), id],
        )?;
        Ok(())
    }

    /// Completed operations with both actual timestamps inside the
    /// period. Qualifying input for the capacity reporter.
    pub fn load_completed_in_period(
        &self,
        work_center_id: WorkCenterId,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Operation>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM operations \
             WHERE work_center_id = ?1 AND status = 'completed' \
               AND actual_start IS NOT NULL AND actual_end IS NOT NULL \
               AND actual_start >= ?2 AND actual_end <= ?3 \
             ORDER BY actual_end",
            OPERATION_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![work_center_id, period_start, period_end], map_operation_row)?;
        let mut ops = Vec::new();
        for row in rows {
            ops.push(finish_operation(row?)?);
        }
        Ok(ops)
    }

    /// Subset of the given ids that have reached completed. Dependency
    /// satisfaction lookup for the conflict detector and lifecycle.
    pub fn completed_ids(&self, ids: &[OperationId]) -> RepositoryResult<HashSet<OperationId>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let conn = self.get_conn()?;
        let placeholders = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ");
        let sql = format!(
            "SELECT id FROM operations WHERE status = 'completed' AND id IN ({})",
            placeholders
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut set = HashSet::new();
        for row in rows {
            set.insert(row?);
        }
        Ok(set)
    }
}
