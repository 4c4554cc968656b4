//! Shared types for calendar views.

use chrono::Timelike;
use chrono_tz::Tz;
use egui::{pos2, Rect};
use serde::Serialize;

use crate::models::lesson::Lesson;
use crate::models::settings::CalendarSettings;
use crate::utils::date::to_local;

/// How a block is drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Normal,
    /// Original position of a lesson being dragged
    Dimmed,
    /// Drag preview following the pointer
    Ghost,
    /// Lesson whose bottom edge is being dragged
    Resizing,
}

/// One lesson block ready to paint. Horizontal placement is relative to its
/// day column; vertical placement is in grid pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderedBlock {
    pub lesson: Lesson,
    pub day_index: usize,
    pub top: f32,
    pub height: f32,
    pub left_percent: f32,
    pub width_percent: f32,
    pub state: BlockState,
}

impl RenderedBlock {
    /// Block rectangle inside a day column's rectangle
    pub fn rect_in(&self, column: Rect) -> Rect {
        column_rect(column, self.top, self.height, self.left_percent, self.width_percent)
    }
}

/// "+N more" affordance standing in for a cluster's hidden lessons
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverflowBlock {
    /// Id of the cluster's first lesson
    pub anchor_id: String,
    pub day_index: usize,
    pub top: f32,
    pub height: f32,
    pub left_percent: f32,
    pub width_percent: f32,
    pub label: String,
    pub lessons: Vec<Lesson>,
}

impl OverflowBlock {
    pub fn rect_in(&self, column: Rect) -> Rect {
        column_rect(column, self.top, self.height, self.left_percent, self.width_percent)
    }
}

fn column_rect(column: Rect, top: f32, height: f32, left_percent: f32, width_percent: f32) -> Rect {
    let left = column.left() + column.width() * left_percent / 100.0;
    let width = column.width() * width_percent / 100.0;
    let top = column.top() + top;
    Rect::from_min_max(pos2(left, top), pos2(left + width, top + height))
}

/// Working hours widened to cover every lesson.
///
/// A lesson starting before `start_hour` pulls the window back to its start
/// hour; one ending after `end_hour` pushes it out to the next whole hour.
/// Lessons running past local midnight extend the window to 24.
pub fn visible_hours(settings: &CalendarSettings, lessons: &[Lesson], tz: &Tz) -> (u32, u32) {
    let mut start_hour = settings.start_hour;
    let mut end_hour = settings.end_hour;

    for lesson in lessons {
        let start = to_local(tz, lesson.start_at);
        let end = to_local(tz, lesson.end_at);

        start_hour = start_hour.min(start.hour());

        let end_ceil = if end.date() > start.date() {
            24
        } else if end.minute() > 0 || end.second() > 0 {
            end.hour() + 1
        } else {
            end.hour()
        };
        end_hour = end_hour.max(end_ceil.min(24));
    }

    if start_hour != settings.start_hour || end_hour != settings.end_hour {
        log::debug!(
            "Visible hours widened to {}-{} around {} lessons",
            start_hour,
            end_hour,
            lessons.len()
        );
    }

    (start_hour, end_hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use chrono_tz::UTC;
    use egui::Vec2;

    fn lesson(id: &str, h: u32, m: u32, minutes: i64) -> Lesson {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap();
        Lesson::new(id, "t-1", start, start + Duration::minutes(minutes)).unwrap()
    }

    #[test]
    fn test_visible_hours_default_window() {
        let settings = CalendarSettings::default();
        assert_eq!(visible_hours(&settings, &[lesson("a", 9, 0, 60)], &UTC), (7, 21));
    }

    #[test]
    fn test_visible_hours_expand_both_ends() {
        let settings = CalendarSettings::default();
        let lessons = vec![lesson("early", 6, 30, 60), lesson("late", 21, 0, 30)];
        assert_eq!(visible_hours(&settings, &lessons, &UTC), (6, 22));
    }

    #[test]
    fn test_visible_hours_past_midnight() {
        let settings = CalendarSettings::default();
        let lessons = vec![lesson("night", 23, 30, 60)];
        assert_eq!(visible_hours(&settings, &lessons, &UTC), (7, 24));
    }

    #[test]
    fn test_block_rect_in_column() {
        let block = RenderedBlock {
            lesson: lesson("a", 9, 0, 60),
            day_index: 0,
            top: 120.0,
            height: 60.0,
            left_percent: 50.0,
            width_percent: 50.0,
            state: BlockState::Normal,
        };
        let column = Rect::from_min_size(pos2(100.0, 10.0), Vec2::new(200.0, 900.0));
        let rect = block.rect_in(column);
        assert_eq!(rect.min, pos2(200.0, 130.0));
        assert_eq!(rect.max, pos2(300.0, 190.0));
    }
}
