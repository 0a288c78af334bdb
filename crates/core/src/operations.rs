use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::*;

/// A single proposed schedule edit.
///
/// Serialized externally tagged in snake_case, e.g.
/// `{"assign_shift": {"employee_id": .., "shift_id": .., "reason": ..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AssignShift {
        employee_id: EmployeeId,
        shift_id: ShiftId,
        reason: String,
    },
    UnassignShift {
        assignment_id: AssignmentId,
        reason: String,
    },
    SwapShifts {
        assignment1_id: AssignmentId,
        assignment2_id: AssignmentId,
        employee1_id: EmployeeId,
        employee2_id: EmployeeId,
        reason: String,
    },
}

impl Operation {
    pub fn assign(employee_id: EmployeeId, shift_id: ShiftId, reason: impl Into<String>) -> Self {
        Self::AssignShift {
            employee_id,
            shift_id,
            reason: reason.into(),
        }
    }

    pub fn unassign(assignment_id: AssignmentId, reason: impl Into<String>) -> Self {
        Self::UnassignShift {
            assignment_id,
            reason: reason.into(),
        }
    }

    pub fn swap(
        assignment1_id: AssignmentId,
        assignment2_id: AssignmentId,
        employee1_id: EmployeeId,
        employee2_id: EmployeeId,
        reason: impl Into<String>,
    ) -> Self {
        Self::SwapShifts {
            assignment1_id,
            assignment2_id,
            employee1_id,
            employee2_id,
            reason: reason.into(),
        }
    }

    /// String name of the operation type for storage/logging.
    pub fn op_type_name(&self) -> &'static str {
        match self {
            Self::AssignShift { .. } => "assign_shift",
            Self::UnassignShift { .. } => "unassign_shift",
            Self::SwapShifts { .. } => "swap_shifts",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::AssignShift { reason, .. }
            | Self::UnassignShift { reason, .. }
            | Self::SwapShifts { reason, .. } => reason,
        }
    }

    pub fn to_msgpack(&self) -> Result<Vec<u8>, CoreError> {
        rmp_serde::to_vec(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, CoreError> {
        rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape_is_externally_tagged() {
        let op = Operation::assign(EmployeeId::new(), ShiftId::new(), "cover sick leave");
        let json = serde_json::to_value(&op).unwrap();
        let body = json.get("assign_shift").expect("tagged by variant name");
        assert!(body.get("employee_id").is_some());
        assert!(body.get("shift_id").is_some());
        assert_eq!(body["reason"], "cover sick leave");
    }

    #[test]
    fn swap_json_keeps_both_legs() {
        let op = Operation::swap(
            AssignmentId::new(),
            AssignmentId::new(),
            EmployeeId::new(),
            EmployeeId::new(),
            "trade",
        );
        let json = serde_json::to_value(&op).unwrap();
        let body = &json["swap_shifts"];
        for key in ["assignment1_id", "assignment2_id", "employee1_id", "employee2_id"] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn msgpack_preserves_variant() {
        let op = Operation::unassign(AssignmentId::new(), "no longer needed");
        let bytes = op.to_msgpack().unwrap();
        assert_eq!(Operation::from_msgpack(&bytes).unwrap(), op);
        assert_eq!(op.op_type_name(), "unassign_shift");
        assert_eq!(op.reason(), "no longer needed");
    }
}
