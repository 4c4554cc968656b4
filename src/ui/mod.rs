pub mod drag;
pub mod gesture;
pub mod overlap_layout;
pub mod resize;
pub mod time_geometry;
pub mod views;
