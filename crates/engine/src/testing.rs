use schedule_core::{
    ids::*,
    schedule::{Assignment, AvailabilitySlot, EmployeeSnapshot, ScheduleSnapshot, ShiftInstance},
    time::{TimeRange, Weekday},
};

/// In-memory schedule builder for checker and diff unit tests.
pub(crate) struct Fixture {
    pub snapshot: ScheduleSnapshot,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            snapshot: ScheduleSnapshot {
                store_id: StoreId::new(),
                week_id: WeekId::new(2026, 42).unwrap(),
                version: Version::INITIAL,
                employees: Vec::new(),
                shifts: Vec::new(),
                assignments: Vec::new(),
            },
        }
    }

    pub fn employee(&mut self, name: &str, weekly_target_minutes: u32) -> EmployeeId {
        self.employee_with(name, weekly_target_minutes, &[], Vec::new())
    }

    pub fn employee_with(
        &mut self,
        name: &str,
        weekly_target_minutes: u32,
        roles: &[&str],
        availability: Vec<AvailabilitySlot>,
    ) -> EmployeeId {
        let employee_id = EmployeeId::new();
        self.snapshot.employees.push(EmployeeSnapshot {
            employee_id,
            name: name.into(),
            weekly_target_minutes,
            roles: roles.iter().map(|r| r.to_string()).collect(),
            availability,
        });
        employee_id
    }

    pub fn shift(&mut self, day: Weekday, start: (u16, u16), end: (u16, u16), role: &str) -> ShiftId {
        self.shift_with_capacity(day, start, end, role, 1)
    }

    pub fn shift_with_capacity(
        &mut self,
        day: Weekday,
        start: (u16, u16),
        end: (u16, u16),
        role: &str,
        capacity: u32,
    ) -> ShiftId {
        let shift_id = ShiftId::new();
        self.snapshot.shifts.push(ShiftInstance {
            shift_id,
            day,
            range: TimeRange::from_hm(start, end).unwrap(),
            role: role.into(),
            capacity,
            template_id: None,
        });
        shift_id
    }

    pub fn assign(&mut self, employee_id: EmployeeId, shift_id: ShiftId) -> AssignmentId {
        let shift = self.snapshot.shift(shift_id).unwrap().clone();
        let assignment_id = AssignmentId::new();
        self.snapshot.assignments.push(Assignment {
            assignment_id,
            shift_id,
            employee_id,
            day: shift.day,
            duration_minutes: shift.duration_minutes(),
        });
        assignment_id
    }
}
