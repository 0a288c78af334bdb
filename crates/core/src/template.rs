use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{ShiftId, TemplateId};
use crate::schedule::ShiftInstance;
use crate::time::{TimeRange, Weekday};

/// A recurring shift definition that is expanded into concrete instances per week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTemplate {
    pub template_id: TemplateId,
    pub weekdays: Vec<Weekday>,
    pub range: TimeRange,
    pub role: String,
    pub capacity: u32,
}

impl ShiftTemplate {
    pub fn expand(&self) -> Result<Vec<ShiftInstance>, CoreError> {
        if self.capacity == 0 {
            return Err(CoreError::InvalidData(format!(
                "template {} has zero capacity",
                self.template_id
            )));
        }
        let mut days = self.weekdays.clone();
        days.sort();
        days.dedup();
        Ok(days
            .into_iter()
            .map(|day| ShiftInstance {
                shift_id: ShiftId::new(),
                day,
                range: self.range,
                role: self.role.clone(),
                capacity: self.capacity,
                template_id: Some(self.template_id),
            })
            .collect())
    }
}

/// Expand every template into the week's shift instances, ordered by day then start time.
pub fn expand_templates(templates: &[ShiftTemplate]) -> Result<Vec<ShiftInstance>, CoreError> {
    let mut shifts = Vec::new();
    for template in templates {
        shifts.extend(template.expand()?);
    }
    shifts.sort_by_key(|s| (s.day, s.range.start_minute()));
    Ok(shifts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(weekdays: Vec<Weekday>, start: u16, capacity: u32) -> ShiftTemplate {
        ShiftTemplate {
            template_id: TemplateId::new(),
            weekdays,
            range: TimeRange::new(start, start + 240).unwrap(),
            role: "Cashier".into(),
            capacity,
        }
    }

    #[test]
    fn one_instance_per_distinct_weekday() {
        let t = template(vec![Weekday::Fri, Weekday::Mon, Weekday::Mon], 480, 2);
        let shifts = t.expand().unwrap();
        assert_eq!(shifts.len(), 2);
        assert_eq!(shifts[0].day, Weekday::Mon);
        assert_eq!(shifts[1].day, Weekday::Fri);
        assert!(shifts.iter().all(|s| s.template_id == Some(t.template_id)));
        assert_ne!(shifts[0].shift_id, shifts[1].shift_id);
    }

    #[test]
    fn expansion_is_ordered_across_templates() {
        let late = template(vec![Weekday::Mon], 900, 1);
        let early = template(vec![Weekday::Mon, Weekday::Tue], 360, 1);
        let shifts = expand_templates(&[late, early]).unwrap();
        let order: Vec<_> = shifts
            .iter()
            .map(|s| (s.day, s.range.start_minute()))
            .collect();
        assert_eq!(
            order,
            vec![(Weekday::Mon, 360), (Weekday::Mon, 900), (Weekday::Tue, 360)]
        );
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(template(vec![Weekday::Mon], 480, 0).expand().is_err());
    }
}
