// Service module exports

pub mod closure;
pub mod conflict;
pub mod database;
pub mod lesson;
pub mod recurrence;
pub mod settings;
