// ==========================================
// Production Scheduling Engine - SQLite connection init
// ==========================================
// Goals:
// - Every Connection::open goes through one place so PRAGMA behavior
//   is uniform (foreign_keys on, shared busy_timeout)
// - Schema creation is idempotent and embedded; there is no separate
//   migration runner for this crate
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Embedded schema. Timestamps are RFC 3339 TEXT (UTC); dates are
/// ISO 8601 TEXT. The (work_order_id, work_center_id) unique pair caps
/// routing at one operation per work center per order.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS work_centers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    capacity_hours_per_day REAL NOT NULL DEFAULT 8.0 CHECK (capacity_hours_per_day > 0),
    setup_time_minutes INTEGER NOT NULL DEFAULT 0 CHECK (setup_time_minutes >= 0),
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS work_orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reference_number TEXT NOT NULL UNIQUE,
    product_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    priority_level INTEGER NOT NULL DEFAULT 3 CHECK (priority_level IN (1, 2, 3)),
    delivery_date TEXT,
    assembly_date TEXT,
    tertiary_date TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS operations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    work_order_id INTEGER NOT NULL REFERENCES work_orders(id) ON DELETE CASCADE,
    work_center_id INTEGER NOT NULL REFERENCES work_centers(id),
    sequence_number INTEGER NOT NULL DEFAULT 0,
    name TEXT NOT NULL,
    standard_time_minutes INTEGER,
    quantity_target INTEGER,
    quantity_completed INTEGER NOT NULL DEFAULT 0 CHECK (quantity_completed >= 0),
    status TEXT NOT NULL DEFAULT 'pending',
    dependencies TEXT NOT NULL DEFAULT '[]',
    estimated_start TEXT,
    estimated_end TEXT,
    actual_start TEXT,
    actual_end TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (work_order_id, work_center_id)
);

CREATE INDEX IF NOT EXISTS idx_operations_center_status
    ON operations(work_center_id, status);
CREATE INDEX IF NOT EXISTS idx_operations_order
    ON operations(work_order_id);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id TEXT NOT NULL DEFAULT 'global',
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (scope_id, key)
);
"#;

/// Apply the uniform PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must
/// be applied to every connection, not once per database.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a file-backed connection with uniform configuration.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Open an in-memory connection (tests, throwaway runs).
pub fn open_in_memory_connection() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create all tables and indexes if missing. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
