// Lesson Calendar Library
// Scheduling engine: time geometry, overlap layout, gesture controllers,
// recurrence expansion, and the lesson store around them

pub mod error;
pub mod models;
pub mod services;
pub mod ui;
pub mod utils;
