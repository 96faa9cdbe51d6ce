// ==========================================
// Production Scheduling Engine - work center repository
// ==========================================
// Repositories carry no business logic; they map rows and keep
// multi-row writes transactional.
// ==========================================

use crate::domain::schedule::WorkCenterStats;
use crate::domain::work_center::WorkCenter;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// Insert payload for a work center.
#[derive(Debug, Clone)]
pub struct NewWorkCenter {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity_hours_per_day: f64,
    pub setup_time_minutes: i64,
}

pub struct WorkCenterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkCenterRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<WorkCenter> {
        Ok(WorkCenter {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            capacity_hours_per_day: row.get(4)?,
            setup_time_minutes: row.get(5)?,
            is_active: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    const SELECT_COLS: &'static str = "id, code, name, description, capacity_hours_per_day, \
         setup_time_minutes, is_active, created_at";

    pub fn insert(&self, new: NewWorkCenter) -> RepositoryResult<WorkCenter> {
        if new.capacity_hours_per_day <= 0.0 {
            return Err(RepositoryError::FieldValueError {
                field: "capacity_hours_per_day".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if new.setup_time_minutes < 0 {
            return Err(RepositoryError::FieldValueError {
                field: "setup_time_minutes".to_string(),
                message: "must not be negative".to_string(),
            });
        }

        let conn = self.get_conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO work_centers \
                 (code, name, description, capacity_hours_per_day, setup_time_minutes, is_active, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![
                new.code,
                new.name,
                new.description,
                new.capacity_hours_per_day,
                new.setup_time_minutes,
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);
        self.find_by_id(id)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<WorkCenter> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM work_centers WHERE id = ?1", Self::SELECT_COLS);
        conn.query_row(&sql, params![id], Self::map_row)
            .optional()?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "WorkCenter".to_string(),
                id: id.to_string(),
            })
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<WorkCenter>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM work_centers WHERE code = ?1", Self::SELECT_COLS);
        Ok(conn.query_row(&sql, params![code], Self::map_row).optional()?)
    }

    /// Active work centers, ordered by code.
    pub fn find_active(&self) -> RepositoryResult<Vec<WorkCenter>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM work_centers WHERE is_active = 1 ORDER BY code",
            Self::SELECT_COLS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut centers = Vec::new();
        for row in rows {
            centers.push(row?);
        }
        Ok(centers)
    }

    pub fn set_active(&self, code: &str, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            "UPDATE work_centers SET is_active = ?1 WHERE code = ?2",
            params![is_active, code],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WorkCenter".to_string(),
                id: code.to_string(),
            });
        }
        Ok(())
    }

    /// Per-status operation counts and total planned minutes for one
    /// work center queue.
    pub fn operation_statistics(&self, work_center_id: i64) -> RepositoryResult<WorkCenterStats> {
        let conn = self.get_conn()?;
        let stats = conn.query_row(
            "SELECT
                 COUNT(*),
                 COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END), 0),
                 COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0),
                 COALESCE(SUM(COALESCE(standard_time_minutes, 0)), 0),
                 COALESCE(SUM(CASE WHEN status IN ('pending', 'in_progress')
                              THEN COALESCE(standard_time_minutes, 0) ELSE 0 END), 0)
             FROM operations
             WHERE work_center_id = ?1",
            params![work_center_id],
            |row| {
                Ok(WorkCenterStats {
                    total_operations: row.get(0)?,
                    pending_operations: row.get(1)?,
                    in_progress_operations: row.get(2)?,
                    completed_operations: row.get(3)?,
                    total_planned_minutes: row.get(4)?,
                    open_planned_minutes: row.get(5)?,
                })
            },
        )?;
        Ok(stats)
    }
}
