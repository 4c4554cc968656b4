//! Lesson store service entry point.
//! CRUD, range queries and intent application over the SQLite lesson
//! tables, organized across focused submodules.

use rusqlite::Connection;

pub mod crud;
pub mod intents;
pub mod queries;
mod shared;

/// Service for lessons stored in SQLite.
pub struct LessonService<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> LessonService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}
