// ==========================================
// Production Scheduling Engine - work center entity
// ==========================================
// Capacity figures are carried in minutes internally; hours/day is a
// configuration convenience converted exactly once here.
// ==========================================

use crate::domain::types::WorkCenterId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A schedulable resource (machine/line) with finite daily capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCenter {
    pub id: WorkCenterId,
    /// Unique, immutable business code.
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Display/config figure; always > 0. Use `daily_capacity_minutes`.
    pub capacity_hours_per_day: f64,
    /// Fixed changeover time added to every operation; >= 0.
    pub setup_time_minutes: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl WorkCenter {
    /// Daily time budget in minutes.
    pub fn daily_capacity_minutes(&self) -> i64 {
        (self.capacity_hours_per_day * 60.0).round() as i64
    }
}
