// ==========================================
// Production Scheduling Engine - configuration manager
// ==========================================
// Key-value configuration stored in the database (config_kv), scoped
// so per-work-center overrides can sit next to the global defaults.
// Unknown or malformed values fall back to the shipped default; a bad
// config row must not take scheduling down.
// ==========================================

use crate::domain::types::DependencyMode;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

pub const GLOBAL_SCOPE: &str = "global";

pub const KEY_HORIZON_DAYS: &str = "scheduling/horizon_days";
pub const KEY_REPORT_PERIOD_DAYS: &str = "scheduling/report_period_days";
pub const KEY_DEPENDENCY_ENFORCEMENT: &str = "scheduling/dependency_enforcement";

/// Effective scheduling configuration after defaults are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingConfig {
    pub horizon_days: i64,
    pub report_period_days: i64,
    pub dependency_enforcement: DependencyMode,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            report_period_days: 30,
            dependency_enforcement: DependencyMode::Advisory,
        }
    }
}

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn get_value(&self, scope: &str, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![scope, key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_value(&self, scope: &str, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3) \
             ON CONFLICT (scope_id, key) DO UPDATE SET value = excluded.value",
            params![scope, key, value],
        )?;
        Ok(())
    }

    /// Global scheduling configuration with defaults for missing or
    /// malformed keys.
    pub fn load_scheduling_config(&self) -> RepositoryResult<SchedulingConfig> {
        let defaults = SchedulingConfig::default();
        Ok(SchedulingConfig {
            horizon_days: self
                .parsed_i64(KEY_HORIZON_DAYS)?
                .unwrap_or(defaults.horizon_days),
            report_period_days: self
                .parsed_i64(KEY_REPORT_PERIOD_DAYS)?
                .unwrap_or(defaults.report_period_days),
            dependency_enforcement: self
                .parsed_mode(KEY_DEPENDENCY_ENFORCEMENT)?
                .unwrap_or(defaults.dependency_enforcement),
        })
    }

    fn parsed_i64(&self, key: &str) -> RepositoryResult<Option<i64>> {
        Ok(self.get_value(GLOBAL_SCOPE, key)?.and_then(|raw| {
            match raw.parse::<i64>() {
                Ok(v) if v > 0 => Some(v),
                _ => {
                    warn!(key, value = %raw, "ignoring malformed config value");
                    None
                }
            }
        }))
    }

    fn parsed_mode(&self, key: &str) -> RepositoryResult<Option<DependencyMode>> {
        Ok(self.get_value(GLOBAL_SCOPE, key)?.and_then(|raw| {
            let mode = DependencyMode::from_config_str(&raw);
            if mode.is_none() {
                warn!(key, value = %raw, "ignoring malformed config value");
            }
            mode
        }))
    }
}
