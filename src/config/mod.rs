// ==========================================
// Production Scheduling Engine - configuration layer
// ==========================================

pub mod config_manager;

pub use config_manager::{
    ConfigManager, SchedulingConfig, GLOBAL_SCOPE, KEY_DEPENDENCY_ENFORCEMENT,
    KEY_HORIZON_DAYS, KEY_REPORT_PERIOD_DAYS,
};
