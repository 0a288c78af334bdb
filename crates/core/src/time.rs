use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Zero-based ISO index, Monday = 0.
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mon => "MON",
            Self::Tue => "TUE",
            Self::Wed => "WED",
            Self::Thu => "THU",
            Self::Fri => "FRI",
            Self::Sat => "SAT",
            Self::Sun => "SUN",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::InvalidData(format!("unknown weekday: {s}")))
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Mon => chrono::Weekday::Mon,
            Self::Tue => chrono::Weekday::Tue,
            Self::Wed => chrono::Weekday::Wed,
            Self::Thu => chrono::Weekday::Thu,
            Self::Fri => chrono::Weekday::Fri,
            Self::Sat => chrono::Weekday::Sat,
            Self::Sun => chrono::Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A half-open range of minutes within one day: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start_minute: u16,
    end_minute: u16,
}

impl TimeRange {
    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self, CoreError> {
        if start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
            return Err(CoreError::InvalidTimeRange {
                start: start_minute,
                end: end_minute,
            });
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// Builds a range from `HH:MM` clock times.
    pub fn from_hm(start: (u16, u16), end: (u16, u16)) -> Result<Self, CoreError> {
        Self::new(start.0 * 60 + start.1, end.0 * 60 + end.1)
    }

    pub fn start_minute(&self) -> u16 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u16 {
        self.end_minute
    }

    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end_minute - self.start_minute)
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start_minute <= other.start_minute && other.end_minute <= self.end_minute
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

/// A time range pinned to a day, with absolute minute offsets from Monday 00:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekSlot {
    pub day: Weekday,
    pub range: TimeRange,
}

impl WeekSlot {
    pub fn new(day: Weekday, range: TimeRange) -> Self {
        Self { day, range }
    }

    pub fn week_start(&self) -> u32 {
        u32::from(self.day.index()) * u32::from(MINUTES_PER_DAY) + u32::from(self.range.start_minute)
    }

    pub fn week_end(&self) -> u32 {
        u32::from(self.day.index()) * u32::from(MINUTES_PER_DAY) + u32::from(self.range.end_minute)
    }

    pub fn overlaps(&self, other: &WeekSlot) -> bool {
        self.week_start() < other.week_end() && other.week_start() < self.week_end()
    }

    /// Minutes between the end of the earlier slot and the start of the later one.
    /// `None` when the slots overlap.
    pub fn gap_minutes(&self, other: &WeekSlot) -> Option<u32> {
        if self.overlaps(other) {
            None
        } else if self.week_end() <= other.week_start() {
            Some(other.week_start() - self.week_end())
        } else {
            Some(self.week_start() - other.week_end())
        }
    }
}

impl fmt::Display for WeekSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.range)
    }
}

/// Wall-clock source for preview timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rejects_empty_and_inverted() {
        assert!(TimeRange::new(480, 480).is_err());
        assert!(TimeRange::new(600, 480).is_err());
        assert!(TimeRange::new(0, MINUTES_PER_DAY + 1).is_err());
        assert!(TimeRange::new(0, MINUTES_PER_DAY).is_ok());
    }

    #[test]
    fn range_overlap_is_half_open() {
        let morning = TimeRange::from_hm((8, 0), (16, 0)).unwrap();
        let late = TimeRange::from_hm((14, 0), (22, 0)).unwrap();
        let evening = TimeRange::from_hm((16, 0), (22, 0)).unwrap();
        assert!(morning.overlaps(&late));
        assert!(!morning.overlaps(&evening));
        assert_eq!(morning.duration_minutes(), 480);
        assert_eq!(morning.to_string(), "08:00-16:00");
    }

    #[test]
    fn gap_spans_midnight() {
        let late = WeekSlot::new(Weekday::Mon, TimeRange::from_hm((14, 0), (22, 0)).unwrap());
        let early = WeekSlot::new(Weekday::Tue, TimeRange::from_hm((6, 0), (14, 0)).unwrap());
        assert_eq!(late.gap_minutes(&early), Some(8 * 60));
        assert_eq!(early.gap_minutes(&late), Some(8 * 60));
    }

    #[test]
    fn weekday_roundtrips_through_index_and_name() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::from_index(day.index()), Some(day));
            assert_eq!(Weekday::parse(day.as_str()).unwrap(), day);
        }
        assert!(Weekday::from_index(7).is_none());
        assert!(Weekday::parse("FUNDAY").is_err());
    }
}
