// Date utility functions
// Timezone-aware conversions between wall-clock time and instants

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

/// Weekday for a Sunday-based index (0 = Sunday .. 6 = Saturday)
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Sunday-based index of a weekday (0 = Sunday .. 6 = Saturday)
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// The Sunday on or before `date`.
pub fn week_start_sunday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Convert a local wall-clock time in `tz` to an instant.
///
/// Ambiguous times (clocks falling back) resolve to the earlier instant.
/// Times inside a spring-forward gap resolve to the same wall-clock time one
/// hour later.
pub fn resolve_local(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Local wall-clock date-time of an instant in `tz`
pub fn to_local(tz: &Tz, instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(tz).naive_local()
}

pub fn local_date(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    to_local(tz, instant).date()
}

/// Instant of local midnight at the start of `date`
pub fn start_of_local_day(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    resolve_local(tz, date.and_hms_opt(0, 0, 0)?)
}

/// Instant of local midnight at the start of the day after `date`
pub fn end_of_local_day(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    start_of_local_day(tz, date.succ_opt()?)
}
