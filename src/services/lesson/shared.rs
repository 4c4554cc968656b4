use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{self, Row};

use crate::models::lesson::{Lesson, LessonStatus};

pub(crate) const LESSON_COLUMNS: &str =
    "id, title, start_at, end_at, teacher_id, location_id, room_id, status, recurrence_id";

/// Stored instants are fixed-width UTC RFC 3339 so string order is time order.
/// Sub-second precision is dropped.
pub(crate) fn to_db_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn from_db_instant(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn map_lesson_row(row: &Row<'_>) -> rusqlite::Result<Lesson> {
    let status: String = row.get(7)?;
    let status = status
        .parse::<LessonStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(Lesson {
        id: row.get(0)?,
        title: row.get(1)?,
        start_at: from_db_instant(2, row.get(2)?)?,
        end_at: from_db_instant(3, row.get(3)?)?,
        teacher_id: row.get(4)?,
        location_id: row.get(5)?,
        room_id: row.get(6)?,
        status,
        recurrence_id: row.get(8)?,
    })
}
