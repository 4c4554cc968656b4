//! Chronological list of lessons grouped by local date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::models::lesson::Lesson;
use crate::utils::date::{end_of_local_day, local_date, start_of_local_day, to_local};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgendaEntry {
    pub lesson: Lesson,
    pub local_start: NaiveTime,
    pub local_end: NaiveTime,
    /// Cancelled lessons stay listed, flagged for strike-through
    pub cancelled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgendaDay {
    pub date: NaiveDate,
    pub entries: Vec<AgendaEntry>,
}

pub struct AgendaView {
    pub from: NaiveDate,
    pub days: u32,
    pub timezone: Tz,
}

impl AgendaView {
    pub fn new(from: NaiveDate, days: u32, timezone: Tz) -> Self {
        Self {
            from,
            days: days.max(1),
            timezone,
        }
    }

    /// Final date of the window, `None` when it runs past the calendar's end
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.from
            .checked_add_signed(Duration::days(i64::from(self.days) - 1))
    }

    /// Instants to query the lesson store with
    pub fn instant_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((
            start_of_local_day(&self.timezone, self.from)?,
            end_of_local_day(&self.timezone, self.last_date()?)?,
        ))
    }

    /// Group lessons starting inside the window by local date. Dates with no
    /// lessons are left out.
    pub fn group(&self, lessons: &[Lesson]) -> Vec<AgendaDay> {
        let last = self.last_date().unwrap_or(NaiveDate::MAX);
        let mut sorted: Vec<&Lesson> = lessons
            .iter()
            .filter(|lesson| {
                let date = local_date(&self.timezone, lesson.start_at);
                date >= self.from && date <= last
            })
            .collect();
        sorted.sort_by(|a, b| a.start_at.cmp(&b.start_at).then_with(|| a.id.cmp(&b.id)));

        let mut days: Vec<AgendaDay> = Vec::new();
        for lesson in sorted {
            let date = local_date(&self.timezone, lesson.start_at);
            let entry = AgendaEntry {
                lesson: lesson.clone(),
                local_start: to_local(&self.timezone, lesson.start_at).time(),
                local_end: to_local(&self.timezone, lesson.end_at).time(),
                cancelled: lesson.is_cancelled(),
            };
            match days.last_mut() {
                Some(day) if day.date == date => day.entries.push(entry),
                _ => days.push(AgendaDay {
                    date,
                    entries: vec![entry],
                }),
            }
        }
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lesson::LessonStatus;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;
    use pretty_assertions::assert_eq;

    fn lesson(id: &str, start: DateTime<Utc>) -> Lesson {
        Lesson::new(id, "t-1", start, start + Duration::minutes(30)).unwrap()
    }

    #[test]
    fn test_groups_by_local_date() {
        let view = AgendaView::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3, New_York);
        // 02:00 UTC on Jan 2 is still Jan 1 evening in New York
        let evening = lesson("evening", Utc.with_ymd_and_hms(2024, 1, 2, 2, 0, 0).unwrap());
        let morning = lesson("morning", Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap());
        let mut cancelled = lesson("cancelled", Utc.with_ymd_and_hms(2024, 1, 3, 15, 0, 0).unwrap());
        cancelled.status = LessonStatus::Cancelled;
        let outside = lesson("outside", Utc.with_ymd_and_hms(2024, 1, 9, 15, 0, 0).unwrap());

        let days = view.group(&[evening, cancelled, morning, outside]);

        let summary: Vec<(NaiveDate, Vec<&str>)> = days
            .iter()
            .map(|d| (d.date, d.entries.iter().map(|e| e.lesson.id.as_str()).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), vec!["morning", "evening"]),
                (NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), vec!["cancelled"]),
            ]
        );
        assert!(days[1].entries[0].cancelled);
        assert_eq!(days[0].entries[1].local_start, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
    }

    #[test]
    fn test_instant_range_in_zone() {
        let view = AgendaView::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 7, New_York);
        let (start, end) = view.instant_range().unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 8, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_huge_window_has_no_range() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let view = AgendaView::new(from, u32::MAX, New_York);
        assert_eq!(view.last_date(), None);
        assert_eq!(view.instant_range(), None);

        let later = lesson("later", Utc.with_ymd_and_hms(2030, 6, 1, 15, 0, 0).unwrap());
        let days = view.group(&[later]);
        assert_eq!(days.len(), 1);
    }
}
