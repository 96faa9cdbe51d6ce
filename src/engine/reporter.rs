// ==========================================
// Production Scheduling Engine - capacity reporter
// ==========================================
// Realized metrics for one work center over a trailing period.
// Qualifying data: operations that reached completed with BOTH actual
// timestamps inside the period. No qualifying history yields the
// zeroed report; absence of history is not an error.
// ==========================================

use crate::domain::schedule::CapacityReport;
use crate::domain::work_center::WorkCenter;
use crate::engine::capacity;
use crate::repository::operation_repo::OperationRepository;
use crate::repository::error::RepositoryResult;
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::instrument;

/// Default trailing period in days.
pub const DEFAULT_REPORT_PERIOD_DAYS: i64 = 30;

pub struct CapacityReporter {
    operations: OperationRepository,
}

impl CapacityReporter {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            operations: OperationRepository::from_connection(conn),
        }
    }

    #[instrument(skip(self, work_center), fields(code = %work_center.code, days = period_days))]
    pub fn report(
        &self,
        work_center: &WorkCenter,
        period_days: i64,
        as_of: DateTime<Utc>,
    ) -> RepositoryResult<CapacityReport> {
        let period_days = period_days.max(1);
        let period_start = as_of - Duration::days(period_days);
        let completed =
            self.operations
                .load_completed_in_period(work_center.id, period_start, as_of)?;

        if completed.is_empty() {
            return Ok(CapacityReport::zeroed(&work_center.code, period_days));
        }

        let count = completed.len() as i64;
        let total_planned: i64 = completed
            .iter()
            .map(|op| op.standard_time.minutes_or_zero())
            .sum();
        let total_actual: i64 = completed
            .iter()
            .filter_map(|op| op.actual_elapsed_minutes())
            .sum();

        let avg_planned = total_planned as f64 / count as f64;
        let avg_actual = total_actual as f64 / count as f64;

        Ok(CapacityReport {
            work_center_code: work_center.code.clone(),
            period_days,
            completed_count: count,
            total_planned_minutes: total_planned,
            avg_planned_minutes: avg_planned,
            avg_actual_minutes: avg_actual,
            efficiency_percent: capacity::realized_efficiency(avg_planned, avg_actual),
            operations_per_day: count as f64 / period_days as f64,
        })
    }
}
