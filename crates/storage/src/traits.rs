use chrono::{DateTime, Utc};
use schedule_core::{
    ids::*,
    preview::Preview,
    schedule::{Assignment, ScheduleSnapshot},
};

use crate::error::StorageError;

/// Versioned, read-only view of a store's week.
pub trait SnapshotProvider {
    fn current_version(&self, store_id: StoreId, week_id: WeekId) -> Result<Version, StorageError>;

    fn snapshot(&self, store_id: StoreId, week_id: WeekId) -> Result<ScheduleSnapshot, StorageError>;
}

/// Assignment mutations. Every call made through one writer belongs to the
/// same transaction; nothing is visible to other readers until it commits.
pub trait ScheduleWriter: SnapshotProvider {
    /// Insert a binding. Fails if the shift is full or the employee already holds it.
    fn create_assignment(
        &mut self,
        assignment_id: AssignmentId,
        shift_id: ShiftId,
        employee_id: EmployeeId,
    ) -> Result<Assignment, StorageError>;

    /// Remove a binding, returning it as it was.
    fn delete_assignment(&mut self, assignment_id: AssignmentId) -> Result<Assignment, StorageError>;

    /// Move an assignment from `from` to `to`. Fails if `from` does not hold it.
    fn reassign_assignment(
        &mut self,
        assignment_id: AssignmentId,
        from: EmployeeId,
        to: EmployeeId,
    ) -> Result<Assignment, StorageError>;

    /// Compare-and-swap the schedule version from `expected` to its successor.
    fn bump_schedule_version(
        &mut self,
        store_id: StoreId,
        week_id: WeekId,
        expected: Version,
    ) -> Result<Version, StorageError>;
}

pub trait PreviewStore {
    fn insert_preview(&mut self, preview: &Preview) -> Result<(), StorageError>;

    fn get_preview(&self, preview_id: PreviewId) -> Result<Option<Preview>, StorageError>;

    /// Persist the mutable part of a preview: status, inverses, versions, discard reason.
    fn update_preview(&mut self, preview: &Preview) -> Result<(), StorageError>;

    /// Previews of one schedule week, newest first.
    fn list_previews(&self, store_id: StoreId, week_id: WeekId) -> Result<Vec<Preview>, StorageError>;

    /// Delete pending previews past their expiry and previews already discarded by expiry.
    fn delete_expired_previews(&mut self, now: DateTime<Utc>) -> Result<u64, StorageError>;
}
