use schedule_core::{
    ids::*,
    operations::Operation,
    preview::Preview,
    schedule::{AvailabilitySlot, EmployeeSnapshot, ScheduleSnapshot, ShiftInstance},
    template::{expand_templates, ShiftTemplate},
    time::{TimeRange, Weekday},
};
use schedule_engine::{Engine, EngineError};
use schedule_storage::{SqliteStorage, StorageError};

use crate::clock::ManualClock;

/// One store's schedule week behind an engine, with seeding helpers.
pub struct TestStore {
    pub engine: Engine,
    pub clock: ManualClock,
    pub store_id: StoreId,
    pub week_id: WeekId,
}

impl TestStore {
    /// A fresh in-memory store with an open week at version 1.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_storage(SqliteStorage::open_in_memory()?, StoreId::new(), WeekId::new(2026, 42)?)
    }

    /// Wrap existing storage, creating the schedule week if it is missing.
    pub fn with_storage(
        mut storage: SqliteStorage,
        store_id: StoreId,
        week_id: WeekId,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        storage.create_schedule(store_id, week_id)?;
        let clock = ManualClock::new();
        Ok(Self {
            engine: Engine::new(storage).with_clock(clock.clone()),
            clock,
            store_id,
            week_id,
        })
    }

    // ========================================================================
    // Seeding
    // ========================================================================

    pub fn add_employee(&mut self, name: &str, weekly_target_minutes: u32) -> Result<EmployeeId, StorageError> {
        self.add_employee_with(name, weekly_target_minutes, &[], Vec::new())
    }

    pub fn add_employee_with(
        &mut self,
        name: &str,
        weekly_target_minutes: u32,
        roles: &[&str],
        availability: Vec<AvailabilitySlot>,
    ) -> Result<EmployeeId, StorageError> {
        let employee_id = EmployeeId::new();
        self.engine.storage_mut().insert_employee(
            self.store_id,
            &EmployeeSnapshot {
                employee_id,
                name: name.to_string(),
                weekly_target_minutes,
                roles: roles.iter().map(|r| r.to_string()).collect(),
                availability,
            },
        )?;
        Ok(employee_id)
    }

    pub fn add_shift(
        &mut self,
        day: Weekday,
        start: (u16, u16),
        end: (u16, u16),
        role: &str,
    ) -> Result<ShiftId, Box<dyn std::error::Error>> {
        self.add_shift_with_capacity(day, start, end, role, 1)
    }

    pub fn add_shift_with_capacity(
        &mut self,
        day: Weekday,
        start: (u16, u16),
        end: (u16, u16),
        role: &str,
        capacity: u32,
    ) -> Result<ShiftId, Box<dyn std::error::Error>> {
        let shift = ShiftInstance {
            shift_id: ShiftId::new(),
            day,
            range: TimeRange::from_hm(start, end)?,
            role: role.to_string(),
            capacity,
            template_id: None,
        };
        self.engine
            .storage_mut()
            .insert_shift(self.store_id, self.week_id, &shift)?;
        Ok(shift.shift_id)
    }

    /// Expand templates into this week's shift instances.
    pub fn add_templates(&mut self, templates: &[ShiftTemplate]) -> Result<Vec<ShiftId>, Box<dyn std::error::Error>> {
        let shifts = expand_templates(templates)?;
        for shift in &shifts {
            self.engine
                .storage_mut()
                .insert_shift(self.store_id, self.week_id, shift)?;
        }
        Ok(shifts.iter().map(|s| s.shift_id).collect())
    }

    /// Record an already-published assignment without touching the version.
    pub fn seed_assignment(
        &mut self,
        employee_id: EmployeeId,
        shift_id: ShiftId,
    ) -> Result<AssignmentId, StorageError> {
        let assignment_id = AssignmentId::new();
        self.engine
            .storage_mut()
            .insert_assignment(assignment_id, shift_id, employee_id)?;
        Ok(assignment_id)
    }

    // ========================================================================
    // Engine shortcuts
    // ========================================================================

    pub fn version(&self) -> Result<Version, EngineError> {
        self.engine.current_version(self.store_id, self.week_id)
    }

    pub fn snapshot(&self) -> Result<ScheduleSnapshot, EngineError> {
        self.engine.snapshot(self.store_id, self.week_id)
    }

    /// Propose against the current version.
    pub fn propose(&mut self, operations: Vec<Operation>) -> Result<Preview, EngineError> {
        let version = self.version()?;
        self.propose_at(operations, version)
    }

    pub fn propose_at(&mut self, operations: Vec<Operation>, expected: Version) -> Result<Preview, EngineError> {
        self.engine
            .propose(self.store_id, self.week_id, operations, expected)
    }

    /// Current (shift, employee) bindings, sorted.
    pub fn bindings(&self) -> Result<Vec<(ShiftId, EmployeeId)>, EngineError> {
        let mut bindings: Vec<_> = self
            .snapshot()?
            .assignments
            .iter()
            .map(|a| (a.shift_id, a.employee_id))
            .collect();
        bindings.sort();
        Ok(bindings)
    }

    /// The assignment currently binding `employee_id` to `shift_id`.
    pub fn assignment_of(
        &self,
        employee_id: EmployeeId,
        shift_id: ShiftId,
    ) -> Result<Option<AssignmentId>, EngineError> {
        Ok(self
            .snapshot()?
            .assignments
            .iter()
            .find(|a| a.employee_id == employee_id && a.shift_id == shift_id)
            .map(|a| a.assignment_id))
    }
}
