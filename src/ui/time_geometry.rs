//! Pixel ⇄ wall-clock conversions for the time grid.
//!
//! Every vertical position on the grid maps to a time of day through
//! [`y_to_time`] and back through [`time_to_y`]. Both interaction controllers
//! and the overlap layout go through these functions so that where a lesson
//! is drawn and what time it represents never drift apart.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

/// Snap grid in minutes
pub const SNAP_MINUTES: u32 = 15;
/// Minimum rendered height of a lesson block, in pixels
pub const MIN_BLOCK_HEIGHT: f32 = 20.0;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Wall-clock time of day on the grid. `hour` may be 24 when the grid ends at
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub fn from_naive(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute())
    }

    pub fn minutes_of_day(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Combine with a calendar date; 24:00 rolls over to the next midnight.
    pub fn on_date(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        Some(midnight + Duration::minutes(self.minutes_of_day() as i64))
    }
}

/// Non-finite pixel inputs are treated as 0
fn sanitize_px(value: f32) -> f64 {
    if value.is_finite() {
        value as f64
    } else {
        0.0
    }
}

fn valid_hour_height(hour_height: f32) -> Option<f64> {
    (hour_height.is_finite() && hour_height > 0.0).then_some(hour_height as f64)
}

/// Convert a vertical offset from the top of the grid into a time of day.
///
/// Minutes snap to the nearest 15-minute boundary and carry into the hour, so
/// 09:53 becomes 10:00 rather than 09:60. The result is clamped to
/// `[start_hour:00, end_hour:00]`.
pub fn y_to_time(y: f32, hour_height: f32, start_hour: u32, end_hour: u32) -> TimeOfDay {
    let end_hour = end_hour.max(start_hour);
    if valid_hour_height(hour_height).is_none() {
        return TimeOfDay::new(start_hour, 0);
    }

    let offset_minutes = px_to_minutes(y, hour_height);
    let snap = SNAP_MINUTES as f64;
    let snapped = (offset_minutes / snap).round() * snap;
    let total = start_hour as i64 * 60 + snapped as i64;

    let min_total = start_hour as i64 * 60;
    let max_total = end_hour as i64 * 60;
    let total = total.clamp(min_total, max_total);

    TimeOfDay::new(total.div_euclid(60) as u32, total.rem_euclid(60) as u32)
}

/// Vertical offset of a wall-clock time. Times before `start_hour` are negative.
pub fn time_to_y(hour: u32, minute: u32, hour_height: f32, start_hour: u32) -> f32 {
    let minutes = (hour as i64 * 60 + minute as i64) - start_hour as i64 * 60;
    minutes_to_px(minutes as f64, hour_height)
}

/// Pixel span of a number of minutes
pub fn minutes_to_px(minutes: f64, hour_height: f32) -> f32 {
    match valid_hour_height(hour_height) {
        Some(hour_height) => (minutes / MINUTES_PER_HOUR * hour_height) as f32,
        None => 0.0,
    }
}

/// Minutes represented by a pixel span (unsnapped)
pub fn px_to_minutes(px: f32, hour_height: f32) -> f64 {
    match valid_hour_height(hour_height) {
        Some(hour_height) => sanitize_px(px) / hour_height * MINUTES_PER_HOUR,
        None => 0.0,
    }
}

/// Height in pixels of one snap step (a quarter of an hour)
pub fn snap_step_px(hour_height: f32) -> f32 {
    minutes_to_px(SNAP_MINUTES as f64, hour_height)
}

/// Round a pixel offset to the nearest 15-minute row
pub fn snap_y(y: f32, hour_height: f32) -> f32 {
    let step = snap_step_px(hour_height);
    if step <= 0.0 {
        return 0.0;
    }
    ((sanitize_px(y) / step as f64).round() * step as f64) as f32
}

/// Rendered block height for a duration, floored so short lessons stay tappable
pub fn block_height(duration_minutes: f64, hour_height: f32) -> f32 {
    minutes_to_px(duration_minutes, hour_height).max(MIN_BLOCK_HEIGHT)
}

/// Hour scale of a rendered time grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeScale {
    pub hour_height: f32,
    pub start_hour: u32,
    pub end_hour: u32,
}

impl TimeScale {
    pub fn new(hour_height: f32, start_hour: u32, end_hour: u32) -> Self {
        Self {
            hour_height,
            start_hour,
            end_hour: end_hour.max(start_hour),
        }
    }

    pub fn y_to_time(&self, y: f32) -> TimeOfDay {
        y_to_time(y, self.hour_height, self.start_hour, self.end_hour)
    }

    pub fn time_to_y(&self, time: TimeOfDay) -> f32 {
        time_to_y(time.hour, time.minute, self.hour_height, self.start_hour)
    }

    /// Offset of an arbitrary local time, minutes and seconds included
    pub fn naive_time_to_y(&self, time: NaiveTime) -> f32 {
        let minutes = time.num_seconds_from_midnight() as f64 / 60.0
            - self.start_hour as f64 * MINUTES_PER_HOUR;
        minutes_to_px(minutes, self.hour_height)
    }

    pub fn snap_y(&self, y: f32) -> f32 {
        snap_y(y, self.hour_height)
    }

    /// Total height of the grid in pixels
    pub fn grid_height(&self) -> f32 {
        minutes_to_px(
            ((self.end_hour - self.start_hour) * 60) as f64,
            self.hour_height,
        )
    }

    pub fn duration_px(&self, duration: Duration) -> f32 {
        minutes_to_px(duration.num_seconds() as f64 / 60.0, self.hour_height)
    }
}
