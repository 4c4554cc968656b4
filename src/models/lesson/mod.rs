// Lesson module
// Scheduling view of a lesson as loaded from the lesson store

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Lifecycle status of a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl LessonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonStatus::Scheduled => "scheduled",
            LessonStatus::Completed => "completed",
            LessonStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonStatus {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(LessonStatus::Scheduled),
            "completed" => Ok(LessonStatus::Completed),
            "cancelled" => Ok(LessonStatus::Cancelled),
            other => Err(CalendarError::InvalidStatus(other.to_string())),
        }
    }
}

/// A time-boxed lesson on the calendar.
///
/// `id` is immutable. `start_at`/`end_at` are the only fields the scheduling
/// engine ever proposes to change, and only through intents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub teacher_id: String,
    pub location_id: Option<String>,
    pub room_id: Option<String>,
    pub status: LessonStatus,
    pub recurrence_id: Option<String>,
}

impl Lesson {
    /// Create a scheduled lesson with the required fields
    ///
    /// # Examples
    /// ```
    /// use lesson_calendar::models::lesson::Lesson;
    /// use chrono::{Duration, TimeZone, Utc};
    ///
    /// let start = Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap();
    /// let lesson = Lesson::new("l-1", "teacher-1", start, start + Duration::minutes(45)).unwrap();
    /// assert_eq!(lesson.duration(), Duration::minutes(45));
    /// ```
    pub fn new(
        id: impl Into<String>,
        teacher_id: impl Into<String>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> Result<Self, CalendarError> {
        let lesson = Self {
            id: id.into(),
            title: "Lesson".to_string(),
            start_at,
            end_at,
            teacher_id: teacher_id.into(),
            location_id: None,
            room_id: None,
            status: LessonStatus::Scheduled,
            recurrence_id: None,
        };
        lesson.validate()?;
        Ok(lesson)
    }

    pub fn builder() -> LessonBuilder {
        LessonBuilder::new()
    }

    pub fn validate(&self) -> Result<(), CalendarError> {
        if self.id.trim().is_empty() {
            return Err(CalendarError::EmptyLessonId);
        }
        if self.end_at <= self.start_at {
            return Err(CalendarError::InvalidTimeRange);
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        self.end_at - self.start_at
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence_id.is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == LessonStatus::Cancelled
    }

    /// Half-open `[start, end)` overlap test
    pub fn overlaps(&self, other: &Lesson) -> bool {
        self.start_at < other.end_at && other.start_at < self.end_at
    }
}

/// Builder for lessons with optional fields
#[derive(Default)]
pub struct LessonBuilder {
    id: Option<String>,
    title: Option<String>,
    start_at: Option<DateTime<Utc>>,
    end_at: Option<DateTime<Utc>>,
    teacher_id: Option<String>,
    location_id: Option<String>,
    room_id: Option<String>,
    status: Option<LessonStatus>,
    recurrence_id: Option<String>,
}

impl LessonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn start_at(mut self, start_at: DateTime<Utc>) -> Self {
        self.start_at = Some(start_at);
        self
    }

    pub fn end_at(mut self, end_at: DateTime<Utc>) -> Self {
        self.end_at = Some(end_at);
        self
    }

    pub fn teacher_id(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }

    pub fn location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn room_id(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn status(mut self, status: LessonStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn recurrence_id(mut self, recurrence_id: impl Into<String>) -> Self {
        self.recurrence_id = Some(recurrence_id.into());
        self
    }

    /// Build the lesson. A missing id is filled with a fresh UUID.
    pub fn build(self) -> Result<Lesson, CalendarError> {
        let start_at = self.start_at.ok_or(CalendarError::InvalidTimeRange)?;
        let end_at = self.end_at.ok_or(CalendarError::InvalidTimeRange)?;

        let lesson = Lesson {
            id: self
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            title: self.title.unwrap_or_else(|| "Lesson".to_string()),
            start_at,
            end_at,
            teacher_id: self.teacher_id.unwrap_or_default(),
            location_id: self.location_id,
            room_id: self.room_id,
            status: self.status.unwrap_or(LessonStatus::Scheduled),
            recurrence_id: self.recurrence_id,
        };
        lesson.validate()?;
        Ok(lesson)
    }
}
