use serde::{Deserialize, Serialize};

use crate::ids::{EmployeeId, ShiftId};
use crate::time::{TimeRange, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    NotFound,
    InvalidOperation,
    Overlap,
    DoubleBooking,
    Capacity,
    DailyLimit,
    WeeklyHardCeiling,
    WeeklySoftCeiling,
    RestTime,
    RoleMismatch,
    OutsideAvailability,
    ConsecutiveDays,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ConstraintKind,
    pub message: String,
}

/// Blockers and warnings raised for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub blockers: Vec<Violation>,
    pub warnings: Vec<Violation>,
}

impl ConstraintResult {
    pub fn block(&mut self, kind: ConstraintKind, message: impl Into<String>) {
        self.blockers.push(Violation {
            kind,
            message: message.into(),
        });
    }

    pub fn warn(&mut self, kind: ConstraintKind, message: impl Into<String>) {
        self.warnings.push(Violation {
            kind,
            message: message.into(),
        });
    }

    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }

    pub fn has_blocker(&self, kind: ConstraintKind) -> bool {
        self.blockers.iter().any(|v| v.kind == kind)
    }

    pub fn has_warning(&self, kind: ConstraintKind) -> bool {
        self.warnings.iter().any(|v| v.kind == kind)
    }

    pub fn blocker_messages(&self) -> Vec<String> {
        self.blockers.iter().map(|v| v.message.clone()).collect()
    }
}

/// One calendar cell as it reads before and after an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub shift_id: ShiftId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub day: Weekday,
    pub range: TimeRange,
    pub role: String,
    pub before_label: String,
    pub after_label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTotals {
    pub weekly_minutes: u32,
    pub days_worked: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsDelta {
    pub weekly_minutes: i64,
    pub days_worked: i64,
}

impl TotalsDelta {
    pub fn between(before: WeeklyTotals, after: WeeklyTotals) -> Self {
        Self {
            weekly_minutes: i64::from(after.weekly_minutes) - i64::from(before.weekly_minutes),
            days_worked: i64::from(after.days_worked) - i64::from(before.days_worked),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeImpact {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub before: WeeklyTotals,
    pub after: WeeklyTotals,
    pub delta: TotalsDelta,
}

/// Display-only before/after description of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub cells: Vec<CellChange>,
    pub employees: Vec<EmployeeImpact>,
}

impl Diff {
    pub fn impact_for(&self, employee_id: EmployeeId) -> Option<&EmployeeImpact> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_can_be_negative() {
        let before = WeeklyTotals {
            weekly_minutes: 480,
            days_worked: 1,
        };
        let delta = TotalsDelta::between(before, WeeklyTotals::default());
        assert_eq!(delta.weekly_minutes, -480);
        assert_eq!(delta.days_worked, -1);
    }

    #[test]
    fn findings_split_by_severity() {
        let mut a = ConstraintResult::default();
        a.block(ConstraintKind::Overlap, "overlap");
        a.warn(ConstraintKind::RoleMismatch, "role");
        assert!(a.is_blocked());
        assert!(a.has_blocker(ConstraintKind::Overlap));
        assert!(a.has_warning(ConstraintKind::RoleMismatch));
        assert_eq!(a.blocker_messages(), vec!["overlap".to_string()]);
    }
}
