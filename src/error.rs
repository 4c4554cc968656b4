//! Validation errors shared by the models and settings.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Lesson end time must be after start time")]
    InvalidTimeRange,

    #[error("Lesson id cannot be empty")]
    EmptyLessonId,

    #[error("Unknown lesson status: {0}")]
    InvalidStatus(String),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("Weekday index out of range (expected 0..=6): {0}")]
    InvalidWeekday(u8),

    #[error("Recurrence interval must be at least one week")]
    InvalidInterval,

    #[error("Invalid working hours: {start}..{end}")]
    InvalidHours { start: u32, end: u32 },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}
