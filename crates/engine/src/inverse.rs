use schedule_core::{
    operations::Operation,
    schedule::{AppliedChange, ScheduleSnapshot},
    CoreError,
};

use crate::error::EngineError;

/// Derive the operation that reverses `op`, from the state captured before it ran.
///
/// `pre` is the working snapshot immediately before `op`; `change` is what
/// applying `op` did, including the id of any assignment it created.
pub fn invert(
    op: &Operation,
    pre: &ScheduleSnapshot,
    change: &AppliedChange,
) -> Result<Operation, EngineError> {
    let reason = format!("undo {}", op.op_type_name());
    match (op, change) {
        (Operation::AssignShift { .. }, AppliedChange::Assigned(created)) => {
            Ok(Operation::unassign(created.assignment_id, reason))
        }

        (Operation::UnassignShift { assignment_id, .. }, AppliedChange::Unassigned(_)) => {
            let removed = pre.assignment(*assignment_id).ok_or_else(|| {
                CoreError::InvalidOperation(format!(
                    "assignment {assignment_id} missing from captured state"
                ))
            })?;
            Ok(Operation::assign(removed.employee_id, removed.shift_id, reason))
        }

        (
            Operation::SwapShifts {
                assignment1_id,
                assignment2_id,
                employee1_id,
                employee2_id,
                ..
            },
            AppliedChange::Swapped { .. },
        ) => Ok(Operation::swap(
            *assignment1_id,
            *assignment2_id,
            *employee2_id,
            *employee1_id,
            reason,
        )),

        _ => Err(CoreError::InvalidOperation(format!(
            "{} produced a mismatched change",
            op.op_type_name()
        ))
        .into()),
    }
}
