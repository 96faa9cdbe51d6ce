// ==========================================
// Production Scheduling Engine - scheduling API
// ==========================================
// Facade over the scheduling pipeline for one work center: optimize,
// reorder, read the current schedule, and report realized capacity.
// Resolves work centers by code and applies stored configuration; all
// business rules live in the engine layer.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::schedule::{CapacityReport, OptimizationResult, ScheduleEntry, WorkCenterStats};
use crate::domain::types::{OperationId, OptimizeCriterion, WorkOrderId};
use crate::domain::work_center::WorkCenter;
use crate::engine::capacity;
use crate::engine::orchestrator::ScheduleOrchestrator;
use crate::engine::reporter::CapacityReporter;
use crate::repository::work_center_repo::{NewWorkCenter, WorkCenterRepository};
use chrono::Utc;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::instrument;

pub struct SchedulingApi {
    conn: Arc<Mutex<Connection>>,
    centers: WorkCenterRepository,
    config: ConfigManager,
}

impl SchedulingApi {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            centers: WorkCenterRepository::from_connection(conn.clone()),
            config: ConfigManager::from_connection(conn.clone()),
            conn,
        }
    }

    fn resolve_center(&self, code: &str) -> ApiResult<WorkCenter> {
        self.centers
            .find_by_code(code)?
            .ok_or_else(|| ApiError::NotFound(format!("WorkCenter (code={})", code)))
    }

    /// Scheduling writes require an active center; reads do not.
    fn resolve_active_center(&self, code: &str) -> ApiResult<WorkCenter> {
        let center = self.resolve_center(code)?;
        if !center.is_active {
            return Err(ApiError::Conflict(format!(
                "work center {} is inactive and cannot be scheduled",
                code
            )));
        }
        Ok(center)
    }

    fn orchestrator(&self) -> ApiResult<ScheduleOrchestrator> {
        let cfg = self.config.load_scheduling_config()?;
        Ok(ScheduleOrchestrator::new(self.conn.clone(), cfg.horizon_days))
    }

    /// Re-sequence the pending queue of a work center by the given
    /// criterion, project the timeline, and return the annotated
    /// schedule.
    #[instrument(skip(self, criterion))]
    pub fn optimize_schedule(
        &self,
        work_center_code: &str,
        criterion: &OptimizeCriterion,
        order_filter: Option<&[WorkOrderId]>,
    ) -> ApiResult<OptimizationResult> {
        let center = self.resolve_active_center(work_center_code)?;
        let result = self
            .orchestrator()?
            .optimize(&center, criterion, order_filter, None)?;
        Ok(result)
    }

    /// Apply an operator-supplied explicit order.
    #[instrument(skip(self, explicit_order))]
    pub fn reorder_schedule(
        &self,
        work_center_code: &str,
        explicit_order: Vec<OperationId>,
    ) -> ApiResult<OptimizationResult> {
        let center = self.resolve_active_center(work_center_code)?;
        let result = self.orchestrator()?.reorder(&center, explicit_order, None)?;
        Ok(result)
    }

    /// The live queue in stored order; no re-sequencing.
    pub fn get_schedule(&self, work_center_code: &str) -> ApiResult<Vec<ScheduleEntry>> {
        let center = self.resolve_center(work_center_code)?;
        Ok(self.orchestrator()?.current_schedule(&center)?)
    }

    /// Realized capacity metrics over a trailing period. When
    /// `period_days` is absent the configured default applies.
    #[instrument(skip(self))]
    pub fn get_capacity_report(
        &self,
        work_center_code: &str,
        period_days: Option<i64>,
    ) -> ApiResult<CapacityReport> {
        let center = self.resolve_center(work_center_code)?;
        let cfg = self.config.load_scheduling_config()?;
        let reporter = CapacityReporter::new(self.conn.clone());
        Ok(reporter.report(
            &center,
            period_days.unwrap_or(cfg.report_period_days),
            Utc::now(),
        )?)
    }

    // ==========================================
    // Work center administration
    // ==========================================

    pub fn create_work_center(&self, new: NewWorkCenter) -> ApiResult<WorkCenter> {
        Ok(self.centers.insert(new)?)
    }

    pub fn list_active_work_centers(&self) -> ApiResult<Vec<WorkCenter>> {
        Ok(self.centers.find_active()?)
    }

    pub fn set_work_center_active(&self, code: &str, is_active: bool) -> ApiResult<()> {
        Ok(self.centers.set_active(code, is_active)?)
    }

    /// Live per-status queue counts for a work center.
    pub fn work_center_statistics(&self, code: &str) -> ApiResult<WorkCenterStats> {
        let center = self.resolve_center(code)?;
        Ok(self.centers.operation_statistics(center.id)?)
    }

    /// Planned utilization of the open queue against one day of
    /// capacity, clamped at 100.
    pub fn current_utilization(&self, code: &str) -> ApiResult<f64> {
        let center = self.resolve_center(code)?;
        let stats = self.centers.operation_statistics(center.id)?;
        Ok(capacity::planned_utilization(
            stats.open_planned_minutes,
            center.daily_capacity_minutes(),
        ))
    }
}
