use schedule_core::{
    evaluation::{CellChange, Diff, EmployeeImpact, TotalsDelta, WeeklyTotals},
    ids::*,
    operations::Operation,
    schedule::{EmployeeSnapshot, ScheduleSnapshot, ShiftInstance},
};

use crate::constraints::check_structure;

pub const OPEN_LABEL: &str = "Open";

/// Describe what `op` would change on the calendar and in each referenced
/// employee's weekly totals. Never mutates `snapshot`.
pub fn diff(snapshot: &ScheduleSnapshot, op: &Operation) -> Diff {
    if check_structure(snapshot, op).is_blocked() {
        return Diff::default();
    }
    let mut after = snapshot.clone();
    if after.apply(op, AssignmentId::new()).is_err() {
        return Diff::default();
    }

    match op {
        Operation::AssignShift {
            employee_id,
            shift_id,
            ..
        } => {
            let (Some(employee), Some(shift)) =
                (snapshot.employee(*employee_id), snapshot.shift(*shift_id))
            else {
                return Diff::default();
            };
            Diff {
                cells: vec![cell(shift, employee, OPEN_LABEL.into(), label(employee, shift))],
                employees: vec![impact(snapshot, &after, employee)],
            }
        }

        Operation::UnassignShift { assignment_id, .. } => {
            let Some(assignment) = snapshot.assignment(*assignment_id) else {
                return Diff::default();
            };
            let (Some(employee), Some(shift)) = (
                snapshot.employee(assignment.employee_id),
                snapshot.shift(assignment.shift_id),
            ) else {
                return Diff::default();
            };
            Diff {
                cells: vec![cell(shift, employee, label(employee, shift), OPEN_LABEL.into())],
                employees: vec![impact(snapshot, &after, employee)],
            }
        }

        Operation::SwapShifts {
            assignment1_id,
            assignment2_id,
            employee1_id,
            employee2_id,
            ..
        } => {
            let shift_of = |id: AssignmentId| {
                snapshot
                    .assignment(id)
                    .and_then(|a| snapshot.shift(a.shift_id))
            };
            let (Some(shift1), Some(shift2), Some(employee1), Some(employee2)) = (
                shift_of(*assignment1_id),
                shift_of(*assignment2_id),
                snapshot.employee(*employee1_id),
                snapshot.employee(*employee2_id),
            ) else {
                return Diff::default();
            };
            Diff {
                cells: vec![
                    cell(shift1, employee2, label(employee1, shift1), label(employee2, shift1)),
                    cell(shift2, employee1, label(employee2, shift2), label(employee1, shift2)),
                ],
                employees: vec![
                    impact(snapshot, &after, employee1),
                    impact(snapshot, &after, employee2),
                ],
            }
        }
    }
}

/// Calendar label for an employee holding a shift, e.g. `"Alice 08:00-16:00"`.
pub fn label(employee: &EmployeeSnapshot, shift: &ShiftInstance) -> String {
    format!("{} {}", employee.name, shift.range)
}

fn cell(
    shift: &ShiftInstance,
    employee: &EmployeeSnapshot,
    before_label: String,
    after_label: String,
) -> CellChange {
    CellChange {
        shift_id: shift.shift_id,
        employee_id: employee.employee_id,
        employee_name: employee.name.clone(),
        day: shift.day,
        range: shift.range,
        role: shift.role.clone(),
        before_label,
        after_label,
    }
}

fn totals(snapshot: &ScheduleSnapshot, employee_id: EmployeeId) -> WeeklyTotals {
    WeeklyTotals {
        weekly_minutes: snapshot.weekly_minutes(employee_id),
        days_worked: snapshot.days_worked(employee_id).len() as u32,
    }
}

fn impact(
    before: &ScheduleSnapshot,
    after: &ScheduleSnapshot,
    employee: &EmployeeSnapshot,
) -> EmployeeImpact {
    let before = totals(before, employee.employee_id);
    let after = totals(after, employee.employee_id);
    EmployeeImpact {
        employee_id: employee.employee_id,
        employee_name: employee.name.clone(),
        before,
        after,
        delta: TotalsDelta::between(before, after),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use schedule_core::time::Weekday;

    #[test]
    fn assign_opens_cell_and_adds_minutes() {
        let mut fx = Fixture::new();
        let alice = fx.employee("Alice", 960);
        let mon = fx.shift(Weekday::Mon, (8, 0), (16, 0), "Cashier");

        let diff = diff(&fx.snapshot, &Operation::assign(alice, mon, ""));
        assert_eq!(diff.cells.len(), 1);
        assert_eq!(diff.cells[0].before_label, "Open");
        assert_eq!(diff.cells[0].after_label, "Alice 08:00-16:00");

        let impact = diff.impact_for(alice).unwrap();
        assert_eq!(impact.before.weekly_minutes, 0);
        assert_eq!(impact.after.weekly_minutes, 480);
        assert_eq!(impact.delta.weekly_minutes, 480);
        assert_eq!(impact.delta.days_worked, 1);
    }

    #[test]
    fn unassign_reverses_labels() {
        let mut fx = Fixture::new();
        let alice = fx.employee("Alice", 960);
        let mon = fx.shift(Weekday::Mon, (8, 0), (12, 30), "Cashier");
        let assignment = fx.assign(alice, mon);

        let diff = diff(&fx.snapshot, &Operation::unassign(assignment, ""));
        assert_eq!(diff.cells[0].before_label, "Alice 08:00-12:30");
        assert_eq!(diff.cells[0].after_label, "Open");
        assert_eq!(diff.impact_for(alice).unwrap().delta.weekly_minutes, -270);
    }

    #[test]
    fn swap_lists_both_cells_and_employees() {
        let mut fx = Fixture::new();
        let alice = fx.employee("Alice", 960);
        let bob = fx.employee("Bob", 960);
        let mon = fx.shift(Weekday::Mon, (8, 0), (16, 0), "Cashier");
        let tue = fx.shift(Weekday::Tue, (8, 0), (12, 0), "Cashier");
        let a1 = fx.assign(alice, mon);
        let a2 = fx.assign(bob, tue);

        let diff = diff(&fx.snapshot, &Operation::swap(a1, a2, alice, bob, ""));
        assert_eq!(diff.cells.len(), 2);
        assert_eq!(diff.cells[0].after_label, "Bob 08:00-16:00");
        assert_eq!(diff.cells[1].after_label, "Alice 08:00-12:00");
        assert_eq!(diff.impact_for(alice).unwrap().delta.weekly_minutes, -240);
        assert_eq!(diff.impact_for(bob).unwrap().delta.weekly_minutes, 240);
    }

    #[test]
    fn unchanged_totals_still_listed() {
        let mut fx = Fixture::new();
        let alice = fx.employee("Alice", 960);
        let bob = fx.employee("Bob", 960);
        let early = fx.shift(Weekday::Mon, (6, 0), (14, 0), "Cashier");
        let late = fx.shift(Weekday::Mon, (12, 0), (20, 0), "Cashier");
        let a1 = fx.assign(alice, early);
        let a2 = fx.assign(bob, late);

        let diff = diff(&fx.snapshot, &Operation::swap(a1, a2, alice, bob, ""));
        assert_eq!(diff.employees.len(), 2);
        assert!(diff.employees.iter().all(|e| e.delta == TotalsDelta::default()));
    }

    #[test]
    fn invalid_operation_has_empty_diff() {
        let mut fx = Fixture::new();
        let alice = fx.employee("Alice", 960);
        let snapshot = fx.snapshot.clone();

        assert_eq!(diff(&snapshot, &Operation::assign(alice, ShiftId::new(), "")), Diff::default());
        assert_eq!(diff(&snapshot, &Operation::unassign(AssignmentId::new(), "")), Diff::default());
    }
}
