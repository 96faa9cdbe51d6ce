// ==========================================
// Production Scheduling Engine - domain types
// ==========================================
// Closed enums only: every dispatch over these is an exhaustive
// match, so adding a variant is a compile-time-checked change.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity id aliases (SQLite rowids).
pub type WorkCenterId = i64;
pub type WorkOrderId = i64;
pub type OperationId = i64;

// ==========================================
// Execution status (work orders and operations)
// ==========================================
// Stored as snake_case strings, matching the legacy database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ExecutionStatus {
    /// Parse a stored status string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ExecutionStatus::Pending),
            "in_progress" => Some(ExecutionStatus::InProgress),
            "completed" => Some(ExecutionStatus::Completed),
            "cancelled" => Some(ExecutionStatus::Cancelled),
            _ => None,
        }
    }

    /// Database representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::InProgress => "in_progress",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    /// Completed is the only terminal state; cancelled leaves via reopen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// Entity kind (status transition target)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    WorkOrder,
    Operation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::WorkOrder => write!(f, "work_order"),
            EntityKind::Operation => write!(f, "operation"),
        }
    }
}

// ==========================================
// Work order priority
// ==========================================
// Level scheme, not a score: 1 urgent, 2 elevated, 3 normal (default).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    Elevated,
    Normal,
}

impl Priority {
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            1 => Some(Priority::Urgent),
            2 => Some(Priority::Elevated),
            3 => Some(Priority::Normal),
            _ => None,
        }
    }

    pub fn level(&self) -> i64 {
        match self {
            Priority::Urgent => 1,
            Priority::Elevated => 2,
            Priority::Normal => 3,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

// ==========================================
// Standard time (norma)
// ==========================================
// "Unestimated" is deliberately distinct from "zero minutes": the
// projector treats it as zero duration but surfaces a warning instead
// of silently folding it into capacity math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "Option<i64>")]
pub enum StandardTime {
    Unestimated,
    Minutes(i64),
}

impl StandardTime {
    pub fn is_unestimated(&self) -> bool {
        matches!(self, StandardTime::Unestimated)
    }

    /// Planned duration in minutes; unestimated counts as zero.
    pub fn minutes_or_zero(&self) -> i64 {
        match self {
            StandardTime::Unestimated => 0,
            StandardTime::Minutes(m) => *m,
        }
    }

    pub fn to_db(&self) -> Option<i64> {
        match self {
            StandardTime::Unestimated => None,
            StandardTime::Minutes(m) => Some(*m),
        }
    }
}

impl From<Option<i64>> for StandardTime {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(m) => StandardTime::Minutes(m),
            None => StandardTime::Unestimated,
        }
    }
}

impl From<StandardTime> for Option<i64> {
    fn from(value: StandardTime) -> Self {
        value.to_db()
    }
}

// ==========================================
// Optimization criterion
// ==========================================
// The custom variant carries the caller-supplied permutation of
// operation ids; the sequencer validates it against the pending set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "order", rename_all = "snake_case")]
pub enum OptimizeCriterion {
    ByDeliveryDate,
    ByAssemblyDate,
    ByTertiaryDate,
    ByUrgency,
    CustomOrder(Vec<OperationId>),
}

impl fmt::Display for OptimizeCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizeCriterion::ByDeliveryDate => write!(f, "by_delivery_date"),
            OptimizeCriterion::ByAssemblyDate => write!(f, "by_assembly_date"),
            OptimizeCriterion::ByTertiaryDate => write!(f, "by_tertiary_date"),
            OptimizeCriterion::ByUrgency => write!(f, "by_urgency"),
            OptimizeCriterion::CustomOrder(_) => write!(f, "custom_order"),
        }
    }
}

// ==========================================
// Conflict classification
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    CapacityExceeded,
    UnsatisfiedDependency,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::CapacityExceeded => write!(f, "capacity_exceeded"),
            ConflictKind::UnsatisfiedDependency => write!(f, "unsatisfied_dependency"),
        }
    }
}

/// Conflict severity. Ordering: Info < Warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

// ==========================================
// Dependency enforcement mode
// ==========================================
// Advisory: unmet dependencies are reported but never block.
// Blocking: a pending -> in_progress transition fails while any
// declared dependency is not yet completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyMode {
    Advisory,
    Blocking,
}

impl DependencyMode {
    pub fn from_config_str(s: &str) -> Option<Self> {
        match s {
            "advisory" => Some(DependencyMode::Advisory),
            "blocking" => Some(DependencyMode::Blocking),
            _ => None,
        }
    }

    pub fn to_config_str(&self) -> &'static str {
        match self {
            DependencyMode::Advisory => "advisory",
            DependencyMode::Blocking => "blocking",
        }
    }
}

impl Default for DependencyMode {
    fn default() -> Self {
        DependencyMode::Advisory
    }
}

impl fmt::Display for DependencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_config_str())
    }
}
