//! Calendar views composed from the layout and interaction engines.
//!
//! Views produce paint-ready models; drawing them is up to the embedding UI.

pub mod agenda_view;
pub mod day_view;
pub mod time_grid;
pub mod types;
pub mod week_view;

pub use agenda_view::{AgendaDay, AgendaEntry, AgendaView};
pub use day_view::DayView;
pub use time_grid::{GridHit, RenderedGrid, TimeGrid};
pub use types::{visible_hours, BlockState, OverflowBlock, RenderedBlock};
pub use week_view::WeekView;
