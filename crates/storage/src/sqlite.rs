use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};

use schedule_core::{
    ids::*,
    preview::{
        decode_evaluations, decode_operations, encode_evaluations, encode_operations,
        DiscardReason, Preview, PreviewStatus,
    },
    schedule::{Assignment, AvailabilitySlot, EmployeeSnapshot, ScheduleSnapshot, ShiftInstance},
    time::{TimeRange, Weekday},
};

use crate::error::StorageError;
use crate::traits::{PreviewStore, ScheduleWriter, SnapshotProvider};

/// Convert Vec<u8> to fixed-size array with proper error handling.
fn to_array<const N: usize>(v: Vec<u8>, label: &str) -> Result<[u8; N], StorageError> {
    v.try_into()
        .map_err(|_| StorageError::Serialization(format!("invalid {label} length")))
}

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64, label: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::Serialization(format!("invalid {label} timestamp: {ms}")))
}

fn version_to_sql(version: Version) -> Result<i64, StorageError> {
    i64::try_from(version.get())
        .map_err(|_| StorageError::Serialization(format!("version {version} out of range")))
}

fn version_from_sql(raw: i64, label: &str) -> Result<Version, StorageError> {
    u64::try_from(raw)
        .map(Version::new)
        .map_err(|_| StorageError::Serialization(format!("invalid {label}: {raw}")))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn schedule_label(store_id: StoreId, week_id: WeekId) -> String {
    format!("{store_id}/{week_id}")
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Begin an `IMMEDIATE` transaction. Dropping it without `commit` rolls back.
    pub fn transaction(&mut self) -> Result<SqliteTransaction<'_>, StorageError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTransaction { tx })
    }

    // ========================================================================
    // Seeding (records owned by the management screens)
    // ========================================================================

    /// Open a schedule week at version 1. Returns the current version if it already exists.
    pub fn create_schedule(&mut self, store_id: StoreId, week_id: WeekId) -> Result<Version, StorageError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO schedules (store_id, week_id, version) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                store_id.as_bytes().as_slice(),
                week_id.to_string(),
                version_to_sql(Version::INITIAL)?,
            ],
        )?;
        read_version(&self.conn, store_id, week_id)
    }

    pub fn insert_employee(
        &mut self,
        store_id: StoreId,
        employee: &EmployeeSnapshot,
    ) -> Result<(), StorageError> {
        let roles = rmp_serde::to_vec(&employee.roles)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let availability = rmp_serde::to_vec(&employee.availability)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO employees (employee_id, store_id, name, weekly_target_minutes, roles, availability) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                employee.employee_id.as_bytes().as_slice(),
                store_id.as_bytes().as_slice(),
                employee.name,
                employee.weekly_target_minutes,
                roles,
                availability,
            ],
        )?;
        Ok(())
    }

    pub fn insert_shift(
        &mut self,
        store_id: StoreId,
        week_id: WeekId,
        shift: &ShiftInstance,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO shift_instances (shift_id, store_id, week_id, day, start_minute, end_minute, role, capacity, template_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                shift.shift_id.as_bytes().as_slice(),
                store_id.as_bytes().as_slice(),
                week_id.to_string(),
                shift.day.index(),
                shift.range.start_minute(),
                shift.range.end_minute(),
                shift.role,
                shift.capacity,
                shift.template_id.map(|t| t.as_bytes().to_vec()),
            ],
        )?;
        Ok(())
    }

    /// Record an assignment that already exists in the published schedule.
    /// Does not advance the schedule version.
    pub fn insert_assignment(
        &mut self,
        assignment_id: AssignmentId,
        shift_id: ShiftId,
        employee_id: EmployeeId,
    ) -> Result<Assignment, StorageError> {
        create_assignment(&self.conn, assignment_id, shift_id, employee_id)
    }
}

/// A write transaction over the schedule and preview tables.
pub struct SqliteTransaction<'conn> {
    tx: rusqlite::Transaction<'conn>,
}

impl SqliteTransaction<'_> {
    pub fn commit(self) -> Result<(), StorageError> {
        self.tx.commit()?;
        Ok(())
    }
}

// ============================================================================
// Shared readers / writers over a connection or an open transaction
// ============================================================================

fn read_version(conn: &Connection, store_id: StoreId, week_id: WeekId) -> Result<Version, StorageError> {
    let version: Option<i64> = conn
        .query_row(
            "SELECT version FROM schedules WHERE store_id = ?1 AND week_id = ?2",
            rusqlite::params![store_id.as_bytes().as_slice(), week_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match version {
        Some(raw) => version_from_sql(raw, "schedule version"),
        None => Err(StorageError::NotFound(format!("schedule {}", schedule_label(store_id, week_id)))),
    }
}

fn read_snapshot(
    conn: &Connection,
    store_id: StoreId,
    week_id: WeekId,
) -> Result<ScheduleSnapshot, StorageError> {
    let version = read_version(conn, store_id, week_id)?;
    let week = week_id.to_string();

    let mut stmt = conn.prepare(
        "SELECT employee_id, name, weekly_target_minutes, roles, availability FROM employees WHERE store_id = ?1 ORDER BY name, employee_id",
    )?;
    let rows = stmt.query_map(rusqlite::params![store_id.as_bytes().as_slice()], |row| {
        Ok((
            row.get::<_, Vec<u8>>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, u32>(2)?,
            row.get::<_, Vec<u8>>(3)?,
            row.get::<_, Vec<u8>>(4)?,
        ))
    })?;
    let mut employees = Vec::new();
    for row in rows {
        let (id_bytes, name, weekly_target_minutes, roles, availability) = row?;
        let roles: Vec<String> = rmp_serde::from_slice(&roles)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let availability: Vec<AvailabilitySlot> = rmp_serde::from_slice(&availability)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        employees.push(EmployeeSnapshot {
            employee_id: EmployeeId::from_bytes(to_array::<16>(id_bytes, "employee_id")?),
            name,
            weekly_target_minutes,
            roles,
            availability,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT shift_id, day, start_minute, end_minute, role, capacity, template_id FROM shift_instances WHERE store_id = ?1 AND week_id = ?2 ORDER BY day, start_minute, shift_id",
    )?;
    let rows = stmt.query_map(
        rusqlite::params![store_id.as_bytes().as_slice(), week],
        |row| {
            Ok((
                row.get::<_, Vec<u8>>(0)?,
                row.get::<_, u8>(1)?,
                row.get::<_, u16>(2)?,
                row.get::<_, u16>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, Option<Vec<u8>>>(6)?,
            ))
        },
    )?;
    let mut shifts = Vec::new();
    for row in rows {
        let (id_bytes, day, start, end, role, capacity, template) = row?;
        shifts.push(ShiftInstance {
            shift_id: ShiftId::from_bytes(to_array::<16>(id_bytes, "shift_id")?),
            day: decode_day(day)?,
            range: TimeRange::new(start, end)?,
            role,
            capacity,
            template_id: template
                .map(|t| to_array::<16>(t, "template_id").map(TemplateId::from_bytes))
                .transpose()?,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT a.assignment_id, a.shift_id, a.employee_id, s.day, s.end_minute - s.start_minute
         FROM assignments a JOIN shift_instances s ON s.shift_id = a.shift_id
         WHERE s.store_id = ?1 AND s.week_id = ?2
         ORDER BY s.day, s.start_minute, a.assignment_id",
    )?;
    let rows = stmt.query_map(
        rusqlite::params![store_id.as_bytes().as_slice(), week_id.to_string()],
        |row| {
            Ok((
                row.get::<_, Vec<u8>>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u32>(4)?,
            ))
        },
    )?;
    let mut assignments = Vec::new();
    for row in rows {
        let (assignment_bytes, shift_bytes, employee_bytes, day, duration_minutes) = row?;
        assignments.push(Assignment {
            assignment_id: AssignmentId::from_bytes(to_array::<16>(assignment_bytes, "assignment_id")?),
            shift_id: ShiftId::from_bytes(to_array::<16>(shift_bytes, "shift_id")?),
            employee_id: EmployeeId::from_bytes(to_array::<16>(employee_bytes, "employee_id")?),
            day: decode_day(day)?,
            duration_minutes,
        });
    }

    Ok(ScheduleSnapshot {
        store_id,
        week_id,
        version,
        employees,
        shifts,
        assignments,
    })
}

fn decode_day(index: u8) -> Result<Weekday, StorageError> {
    Weekday::from_index(index)
        .ok_or_else(|| StorageError::Serialization(format!("invalid day index {index}")))
}

fn read_assignment(conn: &Connection, assignment_id: AssignmentId) -> Result<Assignment, StorageError> {
    let row = conn
        .query_row(
            "SELECT a.shift_id, a.employee_id, s.day, s.end_minute - s.start_minute
             FROM assignments a JOIN shift_instances s ON s.shift_id = a.shift_id
             WHERE a.assignment_id = ?1",
            rusqlite::params![assignment_id.as_bytes().as_slice()],
            |row| {
                Ok((
                    row.get::<_, Vec<u8>>(0)?,
                    row.get::<_, Vec<u8>>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, u32>(3)?,
                ))
            },
        )
        .optional()?;
    let (shift_bytes, employee_bytes, day, duration_minutes) =
        row.ok_or_else(|| StorageError::NotFound(format!("assignment {assignment_id}")))?;
    Ok(Assignment {
        assignment_id,
        shift_id: ShiftId::from_bytes(to_array::<16>(shift_bytes, "shift_id")?),
        employee_id: EmployeeId::from_bytes(to_array::<16>(employee_bytes, "employee_id")?),
        day: decode_day(day)?,
        duration_minutes,
    })
}

fn create_assignment(
    conn: &Connection,
    assignment_id: AssignmentId,
    shift_id: ShiftId,
    employee_id: EmployeeId,
) -> Result<Assignment, StorageError> {
    let shift: Option<(u8, u32, u32)> = conn
        .query_row(
            "SELECT day, end_minute - start_minute, capacity FROM shift_instances WHERE shift_id = ?1",
            rusqlite::params![shift_id.as_bytes().as_slice()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    let (day, duration_minutes, capacity) =
        shift.ok_or_else(|| StorageError::NotFound(format!("shift {shift_id}")))?;

    let employee_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_id = ?1)",
        rusqlite::params![employee_id.as_bytes().as_slice()],
        |row| row.get(0),
    )?;
    if !employee_exists {
        return Err(StorageError::NotFound(format!("employee {employee_id}")));
    }

    let held: u32 = conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE shift_id = ?1",
        rusqlite::params![shift_id.as_bytes().as_slice()],
        |row| row.get(0),
    )?;
    if held >= capacity {
        return Err(StorageError::ConstraintViolation(format!(
            "shift {shift_id} is full ({held}/{capacity})"
        )));
    }

    let result = conn.execute(
        "INSERT INTO assignments (assignment_id, shift_id, employee_id) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            assignment_id.as_bytes().as_slice(),
            shift_id.as_bytes().as_slice(),
            employee_id.as_bytes().as_slice(),
        ],
    );
    match result {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(StorageError::ConstraintViolation(format!(
                "employee {employee_id} already holds shift {shift_id}"
            )));
        }
        Err(e) => return Err(StorageError::Sqlite(e)),
    }

    Ok(Assignment {
        assignment_id,
        shift_id,
        employee_id,
        day: decode_day(day)?,
        duration_minutes,
    })
}

// ============================================================================
// Preview rows
// ============================================================================

const PREVIEW_COLUMNS: &str = "preview_id, store_id, week_id, operations, evaluations, checksum, expected_version, evaluated_version, status, created_at, expires_at, inverse_operations, applied_version, undone_version, discard_reason";

struct PreviewRow {
    preview_id: Vec<u8>,
    store_id: Vec<u8>,
    week_id: String,
    operations: Vec<u8>,
    evaluations: Vec<u8>,
    checksum: Vec<u8>,
    expected_version: i64,
    evaluated_version: i64,
    status: String,
    created_at: i64,
    expires_at: i64,
    inverse_operations: Option<Vec<u8>>,
    applied_version: Option<i64>,
    undone_version: Option<i64>,
    discard_reason: Option<String>,
}

impl PreviewRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            preview_id: row.get(0)?,
            store_id: row.get(1)?,
            week_id: row.get(2)?,
            operations: row.get(3)?,
            evaluations: row.get(4)?,
            checksum: row.get(5)?,
            expected_version: row.get(6)?,
            evaluated_version: row.get(7)?,
            status: row.get(8)?,
            created_at: row.get(9)?,
            expires_at: row.get(10)?,
            inverse_operations: row.get(11)?,
            applied_version: row.get(12)?,
            undone_version: row.get(13)?,
            discard_reason: row.get(14)?,
        })
    }

    fn into_preview(self) -> Result<Preview, StorageError> {
        let preview = Preview {
            preview_id: PreviewId::from_bytes(to_array::<16>(self.preview_id, "preview_id")?),
            store_id: StoreId::from_bytes(to_array::<16>(self.store_id, "store_id")?),
            week_id: self.week_id.parse()?,
            operations: decode_operations(&self.operations)?,
            evaluations: decode_evaluations(&self.evaluations)?,
            checksum: to_array::<32>(self.checksum, "checksum")?,
            expected_version: version_from_sql(self.expected_version, "expected_version")?,
            evaluated_version: version_from_sql(self.evaluated_version, "evaluated_version")?,
            status: PreviewStatus::parse(&self.status)?,
            created_at: from_millis(self.created_at, "created_at")?,
            expires_at: from_millis(self.expires_at, "expires_at")?,
            inverse_operations: match self.inverse_operations {
                Some(bytes) => decode_operations(&bytes)?,
                None => Vec::new(),
            },
            applied_version: self
                .applied_version
                .map(|v| version_from_sql(v, "applied_version"))
                .transpose()?,
            undone_version: self
                .undone_version
                .map(|v| version_from_sql(v, "undone_version"))
                .transpose()?,
            discard_reason: self
                .discard_reason
                .as_deref()
                .map(DiscardReason::parse)
                .transpose()?,
        };
        preview.verify_checksum()?;
        Ok(preview)
    }
}

fn insert_preview(conn: &Connection, preview: &Preview) -> Result<(), StorageError> {
    conn.execute(
        &format!(
            "INSERT INTO previews ({PREVIEW_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
        ),
        rusqlite::params![
            preview.preview_id.as_bytes().as_slice(),
            preview.store_id.as_bytes().as_slice(),
            preview.week_id.to_string(),
            encode_operations(&preview.operations)?,
            encode_evaluations(&preview.evaluations)?,
            &preview.checksum[..],
            version_to_sql(preview.expected_version)?,
            version_to_sql(preview.evaluated_version)?,
            preview.status.as_str(),
            to_millis(preview.created_at),
            to_millis(preview.expires_at),
            encode_inverses(preview)?,
            preview.applied_version.map(version_to_sql).transpose()?,
            preview.undone_version.map(version_to_sql).transpose()?,
            preview.discard_reason.map(|r| r.as_str()),
        ],
    )?;
    Ok(())
}

fn encode_inverses(preview: &Preview) -> Result<Option<Vec<u8>>, StorageError> {
    if preview.inverse_operations.is_empty() {
        Ok(None)
    } else {
        Ok(Some(encode_operations(&preview.inverse_operations)?))
    }
}

fn update_preview(conn: &Connection, preview: &Preview) -> Result<(), StorageError> {
    let updated = conn.execute(
        "UPDATE previews SET status = ?1, inverse_operations = ?2, applied_version = ?3, undone_version = ?4, discard_reason = ?5 WHERE preview_id = ?6",
        rusqlite::params![
            preview.status.as_str(),
            encode_inverses(preview)?,
            preview.applied_version.map(version_to_sql).transpose()?,
            preview.undone_version.map(version_to_sql).transpose()?,
            preview.discard_reason.map(|r| r.as_str()),
            preview.preview_id.as_bytes().as_slice(),
        ],
    )?;
    if updated == 0 {
        return Err(StorageError::NotFound(format!("preview {}", preview.preview_id)));
    }
    Ok(())
}

fn read_preview(conn: &Connection, preview_id: PreviewId) -> Result<Option<Preview>, StorageError> {
    let row = conn
        .query_row(
            &format!("SELECT {PREVIEW_COLUMNS} FROM previews WHERE preview_id = ?1"),
            rusqlite::params![preview_id.as_bytes().as_slice()],
            PreviewRow::from_row,
        )
        .optional()?;
    row.map(PreviewRow::into_preview).transpose()
}

fn read_previews(
    conn: &Connection,
    store_id: StoreId,
    week_id: WeekId,
) -> Result<Vec<Preview>, StorageError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PREVIEW_COLUMNS} FROM previews WHERE store_id = ?1 AND week_id = ?2 ORDER BY created_at DESC, preview_id DESC"
    ))?;
    let rows = stmt
        .query_map(
            rusqlite::params![store_id.as_bytes().as_slice(), week_id.to_string()],
            PreviewRow::from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(PreviewRow::into_preview).collect()
}

fn delete_expired(conn: &Connection, now: DateTime<Utc>) -> Result<u64, StorageError> {
    let deleted = conn.execute(
        "DELETE FROM previews
         WHERE (status = 'pending' AND expires_at <= ?1)
            OR (status = 'discarded' AND discard_reason = 'expired')",
        rusqlite::params![to_millis(now)],
    )?;
    u64::try_from(deleted).map_err(|e| StorageError::Serialization(e.to_string()))
}

// ============================================================================
// Trait implementations
// ============================================================================

impl SnapshotProvider for SqliteStorage {
    fn current_version(&self, store_id: StoreId, week_id: WeekId) -> Result<Version, StorageError> {
        read_version(&self.conn, store_id, week_id)
    }

    fn snapshot(&self, store_id: StoreId, week_id: WeekId) -> Result<ScheduleSnapshot, StorageError> {
        read_snapshot(&self.conn, store_id, week_id)
    }
}

impl PreviewStore for SqliteStorage {
    fn insert_preview(&mut self, preview: &Preview) -> Result<(), StorageError> {
        insert_preview(&self.conn, preview)
    }

    fn get_preview(&self, preview_id: PreviewId) -> Result<Option<Preview>, StorageError> {
        read_preview(&self.conn, preview_id)
    }

    fn update_preview(&mut self, preview: &Preview) -> Result<(), StorageError> {
        update_preview(&self.conn, preview)
    }

    fn list_previews(&self, store_id: StoreId, week_id: WeekId) -> Result<Vec<Preview>, StorageError> {
        read_previews(&self.conn, store_id, week_id)
    }

    fn delete_expired_previews(&mut self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        delete_expired(&self.conn, now)
    }
}

impl SnapshotProvider for SqliteTransaction<'_> {
    fn current_version(&self, store_id: StoreId, week_id: WeekId) -> Result<Version, StorageError> {
        read_version(&self.tx, store_id, week_id)
    }

    fn snapshot(&self, store_id: StoreId, week_id: WeekId) -> Result<ScheduleSnapshot, StorageError> {
        read_snapshot(&self.tx, store_id, week_id)
    }
}

impl ScheduleWriter for SqliteTransaction<'_> {
    fn create_assignment(
        &mut self,
        assignment_id: AssignmentId,
        shift_id: ShiftId,
        employee_id: EmployeeId,
    ) -> Result<Assignment, StorageError> {
        create_assignment(&self.tx, assignment_id, shift_id, employee_id)
    }

    fn delete_assignment(&mut self, assignment_id: AssignmentId) -> Result<Assignment, StorageError> {
        let existing = read_assignment(&self.tx, assignment_id)?;
        self.tx.execute(
            "DELETE FROM assignments WHERE assignment_id = ?1",
            rusqlite::params![assignment_id.as_bytes().as_slice()],
        )?;
        Ok(existing)
    }

    fn reassign_assignment(
        &mut self,
        assignment_id: AssignmentId,
        from: EmployeeId,
        to: EmployeeId,
    ) -> Result<Assignment, StorageError> {
        let existing = read_assignment(&self.tx, assignment_id)?;
        if existing.employee_id != from {
            return Err(StorageError::ConstraintViolation(format!(
                "assignment {assignment_id} is held by {}, not {from}",
                existing.employee_id
            )));
        }
        let result = self.tx.execute(
            "UPDATE assignments SET employee_id = ?1 WHERE assignment_id = ?2",
            rusqlite::params![to.as_bytes().as_slice(), assignment_id.as_bytes().as_slice()],
        );
        match result {
            Ok(_) => Ok(Assignment {
                employee_id: to,
                ..existing
            }),
            Err(e) if is_unique_violation(&e) => Err(StorageError::ConstraintViolation(format!(
                "employee {to} already holds shift {}",
                existing.shift_id
            ))),
            Err(e) => Err(StorageError::Sqlite(e)),
        }
    }

    fn bump_schedule_version(
        &mut self,
        store_id: StoreId,
        week_id: WeekId,
        expected: Version,
    ) -> Result<Version, StorageError> {
        let updated = self.tx.execute(
            "UPDATE schedules SET version = version + 1 WHERE store_id = ?1 AND week_id = ?2 AND version = ?3",
            rusqlite::params![
                store_id.as_bytes().as_slice(),
                week_id.to_string(),
                version_to_sql(expected)?,
            ],
        )?;
        if updated == 0 {
            let current = read_version(&self.tx, store_id, week_id)?;
            return Err(StorageError::VersionConflict {
                schedule: schedule_label(store_id, week_id),
                expected: expected.get(),
                current: current.get(),
            });
        }
        Ok(expected.next())
    }
}

impl PreviewStore for SqliteTransaction<'_> {
    fn insert_preview(&mut self, preview: &Preview) -> Result<(), StorageError> {
        insert_preview(&self.tx, preview)
    }

    fn get_preview(&self, preview_id: PreviewId) -> Result<Option<Preview>, StorageError> {
        read_preview(&self.tx, preview_id)
    }

    fn update_preview(&mut self, preview: &Preview) -> Result<(), StorageError> {
        update_preview(&self.tx, preview)
    }

    fn list_previews(&self, store_id: StoreId, week_id: WeekId) -> Result<Vec<Preview>, StorageError> {
        read_previews(&self.tx, store_id, week_id)
    }

    fn delete_expired_previews(&mut self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        delete_expired(&self.tx, now)
    }
}
