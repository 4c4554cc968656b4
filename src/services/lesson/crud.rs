use super::shared::{map_lesson_row, to_db_instant, LESSON_COLUMNS};
use super::LessonService;
use crate::models::lesson::Lesson;
use anyhow::{anyhow, Context, Result};
use rusqlite::{self, params};

impl<'a> LessonService<'a> {
    /// Insert a lesson.
    pub fn create(&self, lesson: Lesson) -> Result<Lesson> {
        lesson.validate().map_err(|e| anyhow!(e))?;

        self.conn
            .execute(
                "INSERT INTO lessons (
                    id, title, start_at, end_at, teacher_id, location_id, room_id,
                    status, recurrence_id
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    lesson.id,
                    lesson.title,
                    to_db_instant(lesson.start_at),
                    to_db_instant(lesson.end_at),
                    lesson.teacher_id,
                    lesson.location_id,
                    lesson.room_id,
                    lesson.status.as_str(),
                    lesson.recurrence_id,
                ],
            )
            .with_context(|| format!("Failed to insert lesson {}", lesson.id))?;

        Ok(lesson)
    }

    /// Retrieve a lesson by ID.
    pub fn get(&self, id: &str) -> Result<Option<Lesson>> {
        let sql = format!("SELECT {} FROM lessons WHERE id = ?", LESSON_COLUMNS);
        let result = self.conn.query_row(&sql, [id], map_lesson_row);

        match result {
            Ok(lesson) => Ok(Some(lesson)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite every mutable field of an existing lesson.
    pub fn update(&self, lesson: &Lesson) -> Result<()> {
        lesson.validate().map_err(|e| anyhow!(e))?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE lessons SET
                    title = ?, start_at = ?, end_at = ?, teacher_id = ?, location_id = ?,
                    room_id = ?, status = ?, recurrence_id = ?
                 WHERE id = ?",
                params![
                    lesson.title,
                    to_db_instant(lesson.start_at),
                    to_db_instant(lesson.end_at),
                    lesson.teacher_id,
                    lesson.location_id,
                    lesson.room_id,
                    lesson.status.as_str(),
                    lesson.recurrence_id,
                    lesson.id,
                ],
            )
            .context("Failed to update lesson")?;

        if rows_affected == 0 {
            return Err(anyhow!("Lesson with id {} not found", lesson.id));
        }

        Ok(())
    }

    /// Delete a lesson and its participants.
    pub fn delete(&self, id: &str) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM lessons WHERE id = ?", [id])
            .context("Failed to delete lesson")?;

        if rows_affected == 0 {
            return Err(anyhow!("Lesson with id {} not found", id));
        }

        Ok(())
    }

    pub fn add_participant(&self, lesson_id: &str, student_id: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO lesson_participants (lesson_id, student_id) VALUES (?, ?)",
                [lesson_id, student_id],
            )
            .with_context(|| format!("Failed to add participant to lesson {}", lesson_id))?;
        Ok(())
    }

    pub fn remove_participant(&self, lesson_id: &str, student_id: &str) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM lesson_participants WHERE lesson_id = ? AND student_id = ?",
                [lesson_id, student_id],
            )
            .context("Failed to remove participant")?;
        Ok(())
    }

    /// Student ids attending a lesson, sorted.
    pub fn participants(&self, lesson_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id FROM lesson_participants WHERE lesson_id = ? ORDER BY student_id",
        )?;
        let students = stmt
            .query_map([lesson_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(students)
    }
}
