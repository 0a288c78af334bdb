use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound on the preview time box: one week.
pub const MAX_PREVIEW_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Labour-policy thresholds used by the constraint checker, plus the preview time box.
///
/// All fields have defaults matching the store's standard policy. Override
/// through environment variables or by deserializing a config document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingPolicy {
    /// Ceiling on an employee's minutes in one day.
    pub daily_max_minutes: u32,
    /// Weekly minutes above this percentage of target raise a warning.
    pub weekly_soft_ceiling_percent: u32,
    /// Weekly minutes above this percentage of target block the operation.
    pub weekly_hard_ceiling_percent: u32,
    /// Minimum gap between the end of one shift and the start of the next.
    pub min_rest_minutes: u32,
    /// Longest run of consecutive worked days before a warning.
    pub max_consecutive_days: u32,
    /// Seconds an unapplied preview stays actionable.
    pub preview_ttl_secs: u64,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            daily_max_minutes: 600,
            weekly_soft_ceiling_percent: 100,
            weekly_hard_ceiling_percent: 125,
            min_rest_minutes: 11 * 60,
            max_consecutive_days: 6,
            preview_ttl_secs: 15 * 60,
        }
    }
}

impl SchedulingPolicy {
    /// Load the policy from environment variables, falling back to defaults.
    ///
    /// | Env Var                                 | Default |
    /// |-----------------------------------------|---------|
    /// | `SCHEDULE_DAILY_MAX_MINUTES`            | `600`   |
    /// | `SCHEDULE_WEEKLY_SOFT_CEILING_PERCENT`  | `100`   |
    /// | `SCHEDULE_WEEKLY_HARD_CEILING_PERCENT`  | `125`   |
    /// | `SCHEDULE_MIN_REST_MINUTES`             | `660`   |
    /// | `SCHEDULE_MAX_CONSECUTIVE_DAYS`         | `6`     |
    /// | `SCHEDULE_PREVIEW_TTL_SECS`             | `900`   |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let defaults = Self::default();
        let policy = Self {
            daily_max_minutes: parse_var(&lookup, "SCHEDULE_DAILY_MAX_MINUTES", defaults.daily_max_minutes)?,
            weekly_soft_ceiling_percent: parse_var(
                &lookup,
                "SCHEDULE_WEEKLY_SOFT_CEILING_PERCENT",
                defaults.weekly_soft_ceiling_percent,
            )?,
            weekly_hard_ceiling_percent: parse_var(
                &lookup,
                "SCHEDULE_WEEKLY_HARD_CEILING_PERCENT",
                defaults.weekly_hard_ceiling_percent,
            )?,
            min_rest_minutes: parse_var(&lookup, "SCHEDULE_MIN_REST_MINUTES", defaults.min_rest_minutes)?,
            max_consecutive_days: parse_var(
                &lookup,
                "SCHEDULE_MAX_CONSECUTIVE_DAYS",
                defaults.max_consecutive_days,
            )?,
            preview_ttl_secs: parse_var(&lookup, "SCHEDULE_PREVIEW_TTL_SECS", defaults.preview_ttl_secs)?,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.weekly_soft_ceiling_percent > self.weekly_hard_ceiling_percent {
            return Err(CoreError::InvalidConfig(format!(
                "soft ceiling {}% exceeds hard ceiling {}%",
                self.weekly_soft_ceiling_percent, self.weekly_hard_ceiling_percent
            )));
        }
        if self.daily_max_minutes == 0 || self.daily_max_minutes > 24 * 60 {
            return Err(CoreError::InvalidConfig(format!(
                "daily max {} must be within 1..=1440 minutes",
                self.daily_max_minutes
            )));
        }
        if self.max_consecutive_days == 0 {
            return Err(CoreError::InvalidConfig("max consecutive days must be positive".into()));
        }
        if self.preview_ttl_secs == 0 || self.preview_ttl_secs > MAX_PREVIEW_TTL_SECS {
            return Err(CoreError::InvalidConfig(format!(
                "preview ttl {}s must be within 1..={MAX_PREVIEW_TTL_SECS}s",
                self.preview_ttl_secs
            )));
        }
        Ok(())
    }

    pub fn preview_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.preview_ttl_secs.min(MAX_PREVIEW_TTL_SECS) as i64)
    }

    /// Weekly minutes allowed before the soft ceiling trips.
    pub fn weekly_soft_limit(&self, target_minutes: u32) -> u64 {
        u64::from(target_minutes) * u64::from(self.weekly_soft_ceiling_percent) / 100
    }

    /// Weekly minutes allowed before the hard ceiling trips.
    pub fn weekly_hard_limit(&self, target_minutes: u32) -> u64 {
        u64::from(target_minutes) * u64::from(self.weekly_hard_ceiling_percent) / 100
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CoreError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| CoreError::InvalidConfig(format!("{key} is not a valid number: {raw}"))),
        None => Ok(default),
    }
}
