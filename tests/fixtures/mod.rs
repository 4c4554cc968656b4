// Test fixtures - reusable test data
// Lessons, grids and stores shared by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use egui::{pos2, Rect, Vec2};
use lesson_calendar::models::lesson::Lesson;
use lesson_calendar::services::database::Database;
use lesson_calendar::ui::gesture::{GestureHost, GestureKind, GridGeometry};
use lesson_calendar::ui::time_geometry::TimeScale;

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Monday Jan 1, 2024
    pub fn new_year_2024() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// Sunday starting the week of Jan 1, 2024
    pub fn week_of_new_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
    }
}

/// Sample lessons for testing
pub mod lessons {
    use super::*;

    /// UTC lesson on 2024-01-`day` starting at `hour:minute`
    pub fn on_jan(id: &str, day: u32, hour: u32, minute: u32, minutes: i64) -> Lesson {
        let start = Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap();
        Lesson::builder()
            .id(id)
            .title("Piano")
            .teacher_id("teacher-1")
            .location_id("north")
            .room_id("room-1")
            .start_at(start)
            .end_at(start + Duration::minutes(minutes))
            .build()
            .unwrap()
    }

    /// Same-day lesson on Jan 1 between two wall-clock times
    pub fn span(id: &str, from: (u32, u32), to: (u32, u32)) -> Lesson {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, from.0, from.1, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, to.0, to.1, 0).unwrap();
        Lesson::new(id, "teacher-1", start, end).unwrap()
    }
}

/// Week grid painted at (100, 50), 100px per day column, 60px per hour, 07-21
pub fn week_grid(tz: Tz) -> GridGeometry {
    let sunday = dates::week_of_new_year();
    GridGeometry::new(
        Rect::from_min_size(pos2(100.0, 50.0), Vec2::new(700.0, 840.0)),
        (0..7).map(|i| sunday + Duration::days(i)).collect(),
        TimeScale::new(60.0, 7, 21),
        tz,
    )
}

pub fn memory_db() -> Database {
    let db = Database::new(":memory:").unwrap();
    db.initialize_schema().unwrap();
    db
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Attach(GestureKind),
    Detach(GestureKind),
    Haptic,
}

/// Gesture host that records every call, shared so it can be inspected
/// after the controller is dropped
#[derive(Clone, Default)]
pub struct RecordingHost {
    pub events: Rc<RefCell<Vec<HostEvent>>>,
}

impl RecordingHost {
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }
}

impl GestureHost for RecordingHost {
    fn attach_listeners(&mut self, gesture: GestureKind) {
        self.events.borrow_mut().push(HostEvent::Attach(gesture));
    }

    fn detach_listeners(&mut self, gesture: GestureKind) {
        self.events.borrow_mut().push(HostEvent::Detach(gesture));
    }

    fn haptic_feedback(&mut self) {
        self.events.borrow_mut().push(HostEvent::Haptic);
    }
}
