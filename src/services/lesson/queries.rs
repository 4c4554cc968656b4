use super::shared::{map_lesson_row, to_db_instant, LESSON_COLUMNS};
use super::LessonService;
use crate::models::lesson::Lesson;
use anyhow::Result;
use chrono::{DateTime, Utc};

impl<'a> LessonService<'a> {
    /// Lessons overlapping `[start, end)`, ordered by start.
    pub fn find_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Lesson>> {
        let sql = format!(
            "SELECT {} FROM lessons
             WHERE start_at < ?1 AND end_at > ?2
             ORDER BY start_at ASC, id ASC",
            LESSON_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let lessons = stmt
            .query_map([to_db_instant(end), to_db_instant(start)], map_lesson_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lessons)
    }

    /// Every lesson of a series, ordered by start.
    pub fn find_by_recurrence(&self, recurrence_id: &str) -> Result<Vec<Lesson>> {
        let sql = format!(
            "SELECT {} FROM lessons WHERE recurrence_id = ? ORDER BY start_at ASC",
            LESSON_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let lessons = stmt
            .query_map([recurrence_id], map_lesson_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(lessons)
    }
}
