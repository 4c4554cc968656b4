use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_lessons_table(conn)?;
    run_lesson_migrations(conn)?;
    create_participants_table(conn)?;
    create_closure_dates_table(conn)?;
    Ok(())
}

fn create_lessons_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lessons (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            start_at TEXT NOT NULL,
            end_at TEXT NOT NULL,
            teacher_id TEXT NOT NULL,
            location_id TEXT,
            room_id TEXT,
            status TEXT NOT NULL DEFAULT 'scheduled',
            recurrence_id TEXT
        )",
        [],
    )
    .context("Failed to create lessons table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lessons_start_at ON lessons(start_at)",
        [],
    )
    .context("Failed to create lessons start index")?;

    Ok(())
}

fn run_lesson_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "lessons",
        "room_id",
        "ALTER TABLE lessons ADD COLUMN room_id TEXT",
    )?;

    migrations::ensure_column(
        conn,
        "lessons",
        "recurrence_id",
        "ALTER TABLE lessons ADD COLUMN recurrence_id TEXT",
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_lessons_recurrence ON lessons(recurrence_id)",
        [],
    )
    .context("Failed to create lessons recurrence index")?;

    Ok(())
}

fn create_participants_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lesson_participants (
            lesson_id TEXT NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
            student_id TEXT NOT NULL,
            PRIMARY KEY (lesson_id, student_id)
        )",
        [],
    )
    .context("Failed to create lesson_participants table")?;

    Ok(())
}

fn create_closure_dates_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS closure_dates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            location_id TEXT,
            applies_to_all_locations INTEGER NOT NULL DEFAULT 0,
            reason TEXT
        )",
        [],
    )
    .context("Failed to create closure_dates table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_closure_dates_date ON closure_dates(date)",
        [],
    )
    .context("Failed to create closure date index")?;

    Ok(())
}
