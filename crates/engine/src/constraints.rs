use std::collections::BTreeSet;

use schedule_core::{
    evaluation::{ConstraintKind, ConstraintResult},
    ids::*,
    operations::Operation,
    policy::SchedulingPolicy,
    schedule::{Assignment, EmployeeSnapshot, ScheduleSnapshot, ShiftInstance},
    time::Weekday,
};

/// Evaluate one operation against a snapshot.
///
/// Pure and deterministic. Existence and structural problems are reported
/// alone; otherwise every policy check runs and all findings are returned.
pub fn check(
    snapshot: &ScheduleSnapshot,
    policy: &SchedulingPolicy,
    op: &Operation,
) -> ConstraintResult {
    let mut result = check_structure(snapshot, op);
    if result.is_blocked() {
        return result;
    }

    match op {
        Operation::AssignShift {
            employee_id,
            shift_id,
            ..
        } => {
            if let (Some(employee), Some(shift)) =
                (snapshot.employee(*employee_id), snapshot.shift(*shift_id))
            {
                check_placement(snapshot, policy, employee, shift, &[], &mut result);
            }
        }

        Operation::UnassignShift { .. } => {}

        Operation::SwapShifts {
            assignment1_id,
            assignment2_id,
            employee1_id,
            employee2_id,
            ..
        } => {
            let first = snapshot
                .assignment(*assignment1_id)
                .and_then(|a| snapshot.shift(a.shift_id));
            let second = snapshot
                .assignment(*assignment2_id)
                .and_then(|a| snapshot.shift(a.shift_id));
            let (Some(shift1), Some(shift2), Some(employee1), Some(employee2)) = (
                first,
                second,
                snapshot.employee(*employee1_id),
                snapshot.employee(*employee2_id),
            ) else {
                return result;
            };
            let vacated = [*assignment1_id, *assignment2_id];
            check_placement(snapshot, policy, employee1, shift2, &vacated, &mut result);
            check_placement(snapshot, policy, employee2, shift1, &vacated, &mut result);
        }
    }

    result
}

/// Existence and shape checks. A blocked result here means the operation
/// cannot even be simulated.
pub fn check_structure(snapshot: &ScheduleSnapshot, op: &Operation) -> ConstraintResult {
    let mut result = ConstraintResult::default();

    match op {
        Operation::AssignShift {
            employee_id,
            shift_id,
            ..
        } => {
            if snapshot.employee(*employee_id).is_none() {
                result.block(ConstraintKind::NotFound, format!("employee {employee_id} not found"));
            }
            if snapshot.shift(*shift_id).is_none() {
                result.block(ConstraintKind::NotFound, format!("shift {shift_id} not found"));
            }
        }

        Operation::UnassignShift { assignment_id, .. } => {
            if snapshot.assignment(*assignment_id).is_none() {
                result.block(
                    ConstraintKind::NotFound,
                    format!("assignment {assignment_id} not found"),
                );
            }
        }

        Operation::SwapShifts {
            assignment1_id,
            assignment2_id,
            employee1_id,
            employee2_id,
            ..
        } => {
            let first = snapshot.assignment(*assignment1_id);
            let second = snapshot.assignment(*assignment2_id);
            if first.is_none() {
                result.block(
                    ConstraintKind::NotFound,
                    format!("assignment {assignment1_id} not found"),
                );
            }
            if second.is_none() {
                result.block(
                    ConstraintKind::NotFound,
                    format!("assignment {assignment2_id} not found"),
                );
            }
            for employee_id in [employee1_id, employee2_id] {
                if snapshot.employee(*employee_id).is_none() {
                    result.block(ConstraintKind::NotFound, format!("employee {employee_id} not found"));
                }
            }
            let (Some(first), Some(second)) = (first, second) else {
                return result;
            };
            if result.is_blocked() {
                return result;
            }

            if assignment1_id == assignment2_id {
                result.block(
                    ConstraintKind::InvalidOperation,
                    "cannot swap an assignment with itself",
                );
                return result;
            }
            if employee1_id == employee2_id {
                result.block(
                    ConstraintKind::InvalidOperation,
                    "cannot swap shifts between an employee and themselves",
                );
            }
            check_holder(snapshot, first, *employee1_id, &mut result);
            check_holder(snapshot, second, *employee2_id, &mut result);
            if first.shift_id == second.shift_id {
                result.block(
                    ConstraintKind::InvalidOperation,
                    "both assignments belong to the same shift",
                );
            }
        }
    }

    result
}

fn check_holder(
    snapshot: &ScheduleSnapshot,
    assignment: &Assignment,
    expected: EmployeeId,
    result: &mut ConstraintResult,
) {
    if assignment.employee_id != expected {
        result.block(
            ConstraintKind::InvalidOperation,
            format!(
                "assignment {} is held by {}, not {}",
                assignment.assignment_id,
                display_name(snapshot, assignment.employee_id),
                display_name(snapshot, expected),
            ),
        );
    }
}

fn display_name(snapshot: &ScheduleSnapshot, employee_id: EmployeeId) -> String {
    snapshot
        .employee(employee_id)
        .map(|e| e.name.clone())
        .unwrap_or_else(|| employee_id.to_string())
}

/// Policy checks for `employee` taking `shift`, with `vacated` assignments
/// treated as already released.
fn check_placement(
    snapshot: &ScheduleSnapshot,
    policy: &SchedulingPolicy,
    employee: &EmployeeSnapshot,
    shift: &ShiftInstance,
    vacated: &[AssignmentId],
    result: &mut ConstraintResult,
) {
    let employee_id = employee.employee_id;
    let name = &employee.name;
    let slot = shift.slot();
    let kept: Vec<&Assignment> = snapshot
        .assignments_for_employee(employee_id)
        .filter(|a| !vacated.contains(&a.assignment_id))
        .collect();

    // Overlap and double booking
    for assignment in &kept {
        if assignment.shift_id == shift.shift_id {
            result.block(
                ConstraintKind::DoubleBooking,
                format!("{name} already holds the {slot} {} shift", shift.role),
            );
            continue;
        }
        if let Some(other) = snapshot.slot_of(assignment) {
            if other.overlaps(&slot) {
                result.block(
                    ConstraintKind::Overlap,
                    format!("{name} is already working {other}, which overlaps {slot}"),
                );
            }
        }
    }

    // Capacity
    let held = snapshot
        .assignments
        .iter()
        .filter(|a| a.shift_id == shift.shift_id && !vacated.contains(&a.assignment_id))
        .count() as u64;
    if held + 1 > u64::from(shift.capacity) {
        result.block(
            ConstraintKind::Capacity,
            format!(
                "the {slot} {} shift is full ({held}/{})",
                shift.role, shift.capacity
            ),
        );
    }

    // Daily limit
    let day_before = snapshot.day_minutes(employee_id, shift.day);
    let day_after: u32 = kept
        .iter()
        .filter(|a| a.day == shift.day)
        .map(|a| a.duration_minutes)
        .sum::<u32>()
        + shift.duration_minutes();
    if day_after > day_before && day_after > policy.daily_max_minutes {
        result.block(
            ConstraintKind::DailyLimit,
            format!(
                "{name} would work {day_after} minutes on {}, above the {}-minute daily limit",
                shift.day, policy.daily_max_minutes
            ),
        );
    }

    // Weekly ceilings
    let target = employee.weekly_target_minutes;
    let week_before = snapshot.weekly_minutes(employee_id);
    let week_after: u32 =
        kept.iter().map(|a| a.duration_minutes).sum::<u32>() + shift.duration_minutes();
    if target > 0 && week_after > week_before {
        let percent = u64::from(week_after) * 100 / u64::from(target);
        if u64::from(week_after) > policy.weekly_hard_limit(target) {
            result.block(
                ConstraintKind::WeeklyHardCeiling,
                format!(
                    "{name} would reach {week_after} of {target} target minutes ({percent}%), above the {}% ceiling",
                    policy.weekly_hard_ceiling_percent
                ),
            );
        } else if u64::from(week_after) > policy.weekly_soft_limit(target) {
            result.warn(
                ConstraintKind::WeeklySoftCeiling,
                format!("{name} would reach {week_after} of {target} target minutes ({percent}%)"),
            );
        }
    }

    // Rest time
    for assignment in &kept {
        if assignment.shift_id == shift.shift_id {
            continue;
        }
        let Some(other) = snapshot.slot_of(assignment) else {
            continue;
        };
        if let Some(gap) = slot.gap_minutes(&other) {
            if gap < policy.min_rest_minutes {
                result.block(
                    ConstraintKind::RestTime,
                    format!(
                        "{name} would rest only {gap} minutes between {other} and {slot}, below the {}-minute minimum",
                        policy.min_rest_minutes
                    ),
                );
            }
        }
    }

    if !employee.can_work_role(&shift.role) {
        result.warn(
            ConstraintKind::RoleMismatch,
            format!("{name} is not listed for the {} role", shift.role),
        );
    }

    if !employee.is_available_for(shift.day, &shift.range) {
        result.warn(
            ConstraintKind::OutsideAvailability,
            format!("{slot} is outside {name}'s availability"),
        );
    }

    // Consecutive days
    let mut days_after: BTreeSet<Weekday> = kept.iter().map(|a| a.day).collect();
    days_after.insert(shift.day);
    let run_before = longest_run(&snapshot.days_worked(employee_id));
    let run_after = longest_run(&days_after);
    if run_after > run_before && run_after > policy.max_consecutive_days {
        result.warn(
            ConstraintKind::ConsecutiveDays,
            format!(
                "{name} would work {run_after} consecutive days, above {}",
                policy.max_consecutive_days
            ),
        );
    }
}

/// Longest run of consecutive worked days within the week.
fn longest_run(days: &BTreeSet<Weekday>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    for day in Weekday::ALL {
        if days.contains(&day) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}
