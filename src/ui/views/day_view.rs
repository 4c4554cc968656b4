use chrono::{Duration, NaiveDate};

use super::time_grid::TimeGrid;
use super::types::visible_hours;
use crate::models::lesson::Lesson;
use crate::models::settings::CalendarSettings;
use crate::ui::time_geometry::TimeScale;

/// Single-day grid: taller hours, three columns before overflow.
pub struct DayView {
    pub date: NaiveDate,
    pub grid: TimeGrid,
}

impl DayView {
    /// Build the day's grid, widening working hours around `lessons`.
    pub fn new(date: NaiveDate, settings: &CalendarSettings, lessons: &[Lesson]) -> Self {
        let (start_hour, end_hour) = visible_hours(settings, lessons, &settings.timezone);
        let scale = TimeScale::new(settings.day_hour_height, start_hour, end_hour);
        Self {
            date,
            grid: TimeGrid::new(vec![date], scale, settings.day_max_columns, settings.timezone),
        }
    }

    pub fn previous(&self) -> NaiveDate {
        self.date - Duration::days(1)
    }

    pub fn next(&self) -> NaiveDate {
        self.date + Duration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::UTC;

    #[test]
    fn test_day_view_uses_day_settings() {
        let settings = CalendarSettings {
            timezone: UTC,
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
        let early = Lesson::new("early", "t-1", start, start + Duration::minutes(30)).unwrap();

        let view = DayView::new(date, &settings, &[early.clone()]);
        assert_eq!(view.grid.days, vec![date]);
        assert_eq!(view.grid.max_columns, 3);
        assert_eq!(view.grid.scale, TimeScale::new(72.0, 6, 21));

        let rendered = view.grid.render(&[early], None, None);
        assert_eq!(rendered.blocks[0].top, 0.0);
        assert_eq!(view.next(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }
}
