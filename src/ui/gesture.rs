//! Pieces shared by the drag and resize controllers: the host seam for global
//! listeners, the grid geometry snapshot, and the intents handed back to the
//! view layer.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use egui::{pos2, Pos2, Rect, Vec2};
use serde::Serialize;

use super::time_geometry::TimeScale;
use crate::models::lesson::Lesson;
use crate::utils::date::{local_date, resolve_local, to_local};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Drag,
    Resize,
}

/// Platform hooks a controller needs while a gesture is active.
///
/// Global pointer/keyboard listeners are attached only between gesture start
/// and gesture end; every `attach_listeners` is matched by exactly one
/// `detach_listeners`, including when the controller is dropped mid-gesture.
#[cfg_attr(test, mockall::automock)]
pub trait GestureHost {
    fn attach_listeners(&mut self, gesture: GestureKind);
    fn detach_listeners(&mut self, gesture: GestureKind);
    /// Short vibration on touch devices when a drag picks a lesson up
    fn haptic_feedback(&mut self);
}

/// Host for callers that route pointer events themselves
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHost;

impl GestureHost for NoopHost {
    fn attach_listeners(&mut self, _gesture: GestureKind) {}
    fn detach_listeners(&mut self, _gesture: GestureKind) {}
    fn haptic_feedback(&mut self) {}
}

/// Snapshot of the rendered grid a gesture runs over.
#[derive(Clone, Debug, PartialEq)]
pub struct GridGeometry {
    /// Bounding box of the day columns in viewport coordinates
    pub bounds: Rect,
    /// Calendar date of each day column, left to right
    pub days: Vec<NaiveDate>,
    pub scale: TimeScale,
    pub timezone: Tz,
}

impl GridGeometry {
    pub fn new(bounds: Rect, days: Vec<NaiveDate>, scale: TimeScale, timezone: Tz) -> Self {
        Self {
            bounds,
            days,
            scale,
            timezone,
        }
    }

    pub fn column_width(&self) -> f32 {
        self.bounds.width() / self.days.len().max(1) as f32
    }

    /// Viewport pointer position to grid-relative coordinates. `scroll` is the
    /// scroll offset of the grid's scroll container.
    pub fn to_grid(&self, pointer: Pos2, scroll: Vec2) -> Pos2 {
        let x = if pointer.x.is_finite() { pointer.x } else { self.bounds.left() };
        let y = if pointer.y.is_finite() { pointer.y } else { self.bounds.top() };
        pos2(
            x - self.bounds.left() + scroll.x,
            y - self.bounds.top() + scroll.y,
        )
    }

    /// Nearest valid day column for a grid-relative x
    pub fn day_index_at(&self, x: f32) -> usize {
        let last = self.days.len().saturating_sub(1);
        let width = self.column_width();
        if !(width > 0.0) || !x.is_finite() || x <= 0.0 {
            return 0;
        }
        ((x / width).floor() as usize).min(last)
    }

    pub fn day_index_of(&self, instant: DateTime<Utc>) -> Option<usize> {
        let date = local_date(&self.timezone, instant);
        self.days.iter().position(|day| *day == date)
    }

    /// Grid-relative top of an instant on its day column
    pub fn top_of(&self, instant: DateTime<Utc>) -> f32 {
        self.scale
            .naive_time_to_y(to_local(&self.timezone, instant).time())
    }

    /// Snapped wall-clock instant for a grid position
    pub fn instant_at(&self, day_index: usize, y: f32) -> Option<DateTime<Utc>> {
        let date = *self.days.get(day_index)?;
        let local = self.scale.y_to_time(y).on_date(date)?;
        resolve_local(&self.timezone, local)
    }

    /// Drag-to-create over empty grid. `press` and `release` are viewport
    /// positions; the day column is taken from the press. The span runs
    /// between the two snapped rows and is at least `min_duration` long.
    pub fn create_intent(
        &self,
        press: Pos2,
        release: Pos2,
        scroll: Vec2,
        min_duration: Duration,
    ) -> Option<CreateIntent> {
        let from = self.to_grid(press, scroll);
        let to = self.to_grid(release, scroll);
        let day_index = self.day_index_at(from.x);
        let day = *self.days.get(day_index)?;
        let (upper, lower) = if to.y < from.y { (to.y, from.y) } else { (from.y, to.y) };

        let start_at = self.instant_at(day_index, upper)?;
        let end_at = self
            .instant_at(day_index, lower)?
            .max(start_at + min_duration);

        Some(CreateIntent {
            day,
            start_at,
            end_at,
        })
    }
}

/// New lesson proposed by dragging over empty grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateIntent {
    pub day: NaiveDate,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

/// Move a lesson to a new slot, duration preserved
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RescheduleIntent {
    pub lesson: Lesson,
    pub new_start: DateTime<Utc>,
    pub new_end: DateTime<Utc>,
}

/// Change a lesson's end time, start untouched
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResizeIntent {
    pub lesson: Lesson,
    pub new_end: DateTime<Utc>,
}
