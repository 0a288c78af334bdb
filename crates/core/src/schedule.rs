use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::*;
use crate::operations::Operation;
use crate::time::{TimeRange, WeekSlot, Weekday};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftInstance {
    pub shift_id: ShiftId,
    pub day: Weekday,
    pub range: TimeRange,
    pub role: String,
    pub capacity: u32,
    pub template_id: Option<TemplateId>,
}

impl ShiftInstance {
    pub fn slot(&self) -> WeekSlot {
        WeekSlot::new(self.day, self.range)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.range.duration_minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: AssignmentId,
    pub shift_id: ShiftId,
    pub employee_id: EmployeeId,
    pub day: Weekday,
    pub duration_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub day: Weekday,
    pub is_off: bool,
    pub range: TimeRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSnapshot {
    pub employee_id: EmployeeId,
    pub name: String,
    pub weekly_target_minutes: u32,
    /// Roles this employee may work. Empty means any role.
    pub roles: Vec<String>,
    /// Weekly availability windows. Empty means always available.
    pub availability: Vec<AvailabilitySlot>,
}

impl EmployeeSnapshot {
    pub fn can_work_role(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_available_for(&self, day: Weekday, range: &TimeRange) -> bool {
        self.availability.is_empty()
            || self
                .availability
                .iter()
                .any(|a| a.day == day && !a.is_off && a.range.contains(range))
    }
}

/// What a provisional or committed mutation did to the assignment set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedChange {
    Assigned(Assignment),
    /// The removed assignment, as it was before removal.
    Unassigned(Assignment),
    /// Both assignments as they were before the exchange.
    Swapped { first: Assignment, second: Assignment },
}

/// Read-only view of one store's schedule for one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub store_id: StoreId,
    pub week_id: WeekId,
    pub version: Version,
    pub employees: Vec<EmployeeSnapshot>,
    pub shifts: Vec<ShiftInstance>,
    pub assignments: Vec<Assignment>,
}

impl ScheduleSnapshot {
    pub fn employee(&self, employee_id: EmployeeId) -> Option<&EmployeeSnapshot> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }

    pub fn shift(&self, shift_id: ShiftId) -> Option<&ShiftInstance> {
        self.shifts.iter().find(|s| s.shift_id == shift_id)
    }

    pub fn assignment(&self, assignment_id: AssignmentId) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.assignment_id == assignment_id)
    }

    pub fn assignments_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> impl Iterator<Item = &Assignment> {
        self.assignments
            .iter()
            .filter(move |a| a.employee_id == employee_id)
    }

    /// Current total assigned minutes for the week.
    pub fn weekly_minutes(&self, employee_id: EmployeeId) -> u32 {
        self.assignments_for_employee(employee_id)
            .map(|a| a.duration_minutes)
            .sum()
    }

    pub fn day_minutes(&self, employee_id: EmployeeId, day: Weekday) -> u32 {
        self.assignments_for_employee(employee_id)
            .filter(|a| a.day == day)
            .map(|a| a.duration_minutes)
            .sum()
    }

    pub fn days_worked(&self, employee_id: EmployeeId) -> BTreeSet<Weekday> {
        self.assignments_for_employee(employee_id)
            .map(|a| a.day)
            .collect()
    }

    /// Resolve the day/time slot of an assignment through its shift.
    pub fn slot_of(&self, assignment: &Assignment) -> Option<WeekSlot> {
        self.shift(assignment.shift_id).map(ShiftInstance::slot)
    }

    /// Mutate the in-memory assignment set as `op` would.
    ///
    /// `new_assignment_id` is used as the id of an assignment created by
    /// `AssignShift`. Only structural validity is checked here; policy checks
    /// belong to the constraint checker.
    pub fn apply(
        &mut self,
        op: &Operation,
        new_assignment_id: AssignmentId,
    ) -> Result<AppliedChange, CoreError> {
        match op {
            Operation::AssignShift {
                employee_id,
                shift_id,
                ..
            } => {
                if self.employee(*employee_id).is_none() {
                    return Err(CoreError::InvalidOperation(format!(
                        "unknown employee {employee_id}"
                    )));
                }
                let shift = self.shift(*shift_id).ok_or_else(|| {
                    CoreError::InvalidOperation(format!("unknown shift {shift_id}"))
                })?;
                let assignment = Assignment {
                    assignment_id: new_assignment_id,
                    shift_id: *shift_id,
                    employee_id: *employee_id,
                    day: shift.day,
                    duration_minutes: shift.duration_minutes(),
                };
                self.assignments.push(assignment.clone());
                Ok(AppliedChange::Assigned(assignment))
            }

            Operation::UnassignShift { assignment_id, .. } => {
                let index = self.index_of(*assignment_id)?;
                Ok(AppliedChange::Unassigned(self.assignments.remove(index)))
            }

            Operation::SwapShifts {
                assignment1_id,
                assignment2_id,
                employee1_id,
                employee2_id,
                ..
            } => {
                if assignment1_id == assignment2_id {
                    return Err(CoreError::InvalidOperation(
                        "cannot swap an assignment with itself".into(),
                    ));
                }
                let first = self.index_of(*assignment1_id)?;
                let second = self.index_of(*assignment2_id)?;
                if self.assignments[first].employee_id != *employee1_id
                    || self.assignments[second].employee_id != *employee2_id
                {
                    return Err(CoreError::InvalidOperation(format!(
                        "swap holders do not match assignments {assignment1_id} / {assignment2_id}"
                    )));
                }
                let before = AppliedChange::Swapped {
                    first: self.assignments[first].clone(),
                    second: self.assignments[second].clone(),
                };
                self.assignments[first].employee_id = *employee2_id;
                self.assignments[second].employee_id = *employee1_id;
                Ok(before)
            }
        }
    }

    fn index_of(&self, assignment_id: AssignmentId) -> Result<usize, CoreError> {
        self.assignments
            .iter()
            .position(|a| a.assignment_id == assignment_id)
            .ok_or_else(|| CoreError::InvalidOperation(format!("unknown assignment {assignment_id}")))
    }
}
