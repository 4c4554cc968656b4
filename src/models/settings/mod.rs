// Settings module
// Organisation-level calendar configuration consumed by the scheduling engine

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

pub const DEFAULT_START_HOUR: u32 = 7;
pub const DEFAULT_END_HOUR: u32 = 21;
pub const DEFAULT_MIN_LESSON_MINUTES: i64 = 15;
pub const DEFAULT_MAX_SERIES_SIZE: usize = 200;
pub const DEFAULT_HORIZON_DAYS: i64 = 90;
pub const MAX_HORIZON_DAYS: i64 = 3_650;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub timezone: Tz,
    pub start_hour: u32,
    pub end_hour: u32,
    pub day_hour_height: f32,
    pub week_hour_height: f32,
    pub day_max_columns: usize,
    pub week_max_columns: usize,
    pub min_lesson_minutes: i64,
    pub max_series_size: usize,
    pub default_horizon_days: i64,
    pub drag_hold_ms: u64,
    pub conflict_check_timeout_ms: u64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            timezone: Tz::Europe__London,
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            day_hour_height: 72.0,
            week_hour_height: 60.0,
            day_max_columns: 3,
            week_max_columns: 4,
            min_lesson_minutes: DEFAULT_MIN_LESSON_MINUTES,
            max_series_size: DEFAULT_MAX_SERIES_SIZE,
            default_horizon_days: DEFAULT_HORIZON_DAYS,
            drag_hold_ms: 150,
            conflict_check_timeout_ms: 5_000,
        }
    }
}

impl CalendarSettings {
    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(CalendarError::InvalidHours {
                start: self.start_hour,
                end: self.end_hour,
            });
        }
        if !(self.day_hour_height > 0.0 && self.week_hour_height > 0.0) {
            return Err(CalendarError::InvalidSettings(
                "hour heights must be positive".to_string(),
            ));
        }
        if self.day_max_columns == 0 || self.week_max_columns == 0 {
            return Err(CalendarError::InvalidSettings(
                "max columns must be at least 1".to_string(),
            ));
        }
        if self.min_lesson_minutes <= 0 {
            return Err(CalendarError::InvalidSettings(
                "minimum lesson duration must be positive".to_string(),
            ));
        }
        if self.max_series_size == 0 {
            return Err(CalendarError::InvalidSettings(
                "max series size must be at least 1".to_string(),
            ));
        }
        if self.default_horizon_days <= 0 || self.default_horizon_days > MAX_HORIZON_DAYS {
            return Err(CalendarError::InvalidSettings(format!(
                "default recurrence horizon must be between 1 and {} days",
                MAX_HORIZON_DAYS
            )));
        }
        Ok(())
    }

    /// Parse an IANA zone name such as `Europe/London`
    pub fn parse_timezone(name: &str) -> Result<Tz, CalendarError> {
        name.parse::<Tz>()
            .map_err(|_| CalendarError::InvalidTimezone(name.to_string()))
    }

    /// Press-and-hold time before a lesson is picked up
    pub fn hold_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.drag_hold_ms)
    }

    pub fn min_lesson_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.min_lesson_minutes)
    }

    pub fn conflict_check_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.conflict_check_timeout_ms)
    }
}
