use chrono::{Duration, NaiveDate};

use super::time_grid::TimeGrid;
use super::types::visible_hours;
use crate::models::lesson::Lesson;
use crate::models::settings::CalendarSettings;
use crate::ui::time_geometry::TimeScale;
use crate::utils::date::week_start_sunday;

/// Sunday-to-Saturday grid with four columns before overflow.
pub struct WeekView {
    pub week_start: NaiveDate,
    pub grid: TimeGrid,
}

impl WeekView {
    /// Week containing `date`, with hours widened around `lessons`.
    pub fn new(date: NaiveDate, settings: &CalendarSettings, lessons: &[Lesson]) -> Self {
        let week_start = week_start_sunday(date);
        let days = (0..7).map(|i| week_start + Duration::days(i)).collect();
        let (start_hour, end_hour) = visible_hours(settings, lessons, &settings.timezone);
        let scale = TimeScale::new(settings.week_hour_height, start_hour, end_hour);
        Self {
            week_start,
            grid: TimeGrid::new(days, scale, settings.week_max_columns, settings.timezone),
        }
    }

    pub fn previous(&self) -> NaiveDate {
        self.week_start - Duration::days(7)
    }

    pub fn next(&self) -> NaiveDate {
        self.week_start + Duration::days(7)
    }
}
