use rusqlite::Connection;

use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -32000;
        PRAGMA busy_timeout = 5000;
    ",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, unixepoch());

CREATE TABLE IF NOT EXISTS schedules (
    store_id BLOB NOT NULL CHECK (length(store_id) = 16),
    week_id TEXT NOT NULL,
    version INTEGER NOT NULL CHECK (version >= 1),
    PRIMARY KEY (store_id, week_id)
);

CREATE TABLE IF NOT EXISTS employees (
    employee_id BLOB PRIMARY KEY CHECK (length(employee_id) = 16),
    store_id BLOB NOT NULL CHECK (length(store_id) = 16),
    name TEXT NOT NULL,
    weekly_target_minutes INTEGER NOT NULL CHECK (weekly_target_minutes >= 0),
    roles BLOB NOT NULL,
    availability BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_employees_store ON employees(store_id);

CREATE TABLE IF NOT EXISTS shift_instances (
    shift_id BLOB PRIMARY KEY CHECK (length(shift_id) = 16),
    store_id BLOB NOT NULL,
    week_id TEXT NOT NULL,
    day INTEGER NOT NULL CHECK (day BETWEEN 0 AND 6),
    start_minute INTEGER NOT NULL,
    end_minute INTEGER NOT NULL CHECK (end_minute > start_minute AND end_minute <= 1440),
    role TEXT NOT NULL,
    capacity INTEGER NOT NULL CHECK (capacity >= 1),
    template_id BLOB,
    FOREIGN KEY (store_id, week_id) REFERENCES schedules(store_id, week_id)
);
CREATE INDEX IF NOT EXISTS idx_shifts_schedule ON shift_instances(store_id, week_id);

CREATE TABLE IF NOT EXISTS assignments (
    assignment_id BLOB PRIMARY KEY CHECK (length(assignment_id) = 16),
    shift_id BLOB NOT NULL REFERENCES shift_instances(shift_id),
    employee_id BLOB NOT NULL REFERENCES employees(employee_id),
    UNIQUE (shift_id, employee_id)
);
CREATE INDEX IF NOT EXISTS idx_assignments_employee ON assignments(employee_id);

CREATE TABLE IF NOT EXISTS previews (
    preview_id BLOB PRIMARY KEY CHECK (length(preview_id) = 16),
    store_id BLOB NOT NULL,
    week_id TEXT NOT NULL,
    operations BLOB NOT NULL,
    evaluations BLOB NOT NULL,
    checksum BLOB NOT NULL CHECK (length(checksum) = 32),
    expected_version INTEGER NOT NULL,
    evaluated_version INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('pending', 'applied', 'undone', 'discarded')),
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL,
    inverse_operations BLOB,
    applied_version INTEGER,
    undone_version INTEGER,
    discard_reason TEXT CHECK (discard_reason IS NULL OR discard_reason IN ('caller', 'expired'))
);
CREATE INDEX IF NOT EXISTS idx_previews_schedule ON previews(store_id, week_id, created_at);
CREATE INDEX IF NOT EXISTS idx_previews_pending ON previews(status, expires_at);
";
