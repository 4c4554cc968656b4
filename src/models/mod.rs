// Module exports for models

pub mod closure;
pub mod conflict;
pub mod lesson;
pub mod recurrence;
pub mod settings;
