use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};

use crate::models::recurrence::RecurrenceRule;
use crate::utils::date::{resolve_local, to_local, week_start_sunday};

/// Whether `date` falls in an active week of an every-N-weeks pattern
fn in_active_week(anchor_week: NaiveDate, date: NaiveDate, interval_weeks: u32) -> bool {
    if interval_weeks <= 1 {
        return true;
    }
    let weeks = (week_start_sunday(date) - anchor_week).num_days() / 7;
    weeks % interval_weeks as i64 == 0
}

/// Walk every local calendar day from the seed's date through `end_date` and
/// build one candidate per selected weekday at the seed's local wall-clock
/// hour and minute. Each candidate is converted to an instant on its own, so
/// the wall-clock time holds across DST transitions.
///
/// Candidates at or before the seed are dropped.
pub(super) fn candidates(rule: &RecurrenceRule, end_date: NaiveDate) -> Vec<DateTime<Utc>> {
    let mut occurrences = Vec::new();
    if !rule.is_recurring() {
        return occurrences;
    }

    let tz = &rule.timezone;
    let seed_local = to_local(tz, rule.start_date);
    let Some(wall_clock) = NaiveTime::from_hms_opt(seed_local.hour(), seed_local.minute(), 0)
    else {
        return occurrences;
    };

    let start_day = seed_local.date();
    let anchor_week = week_start_sunday(start_day);
    let mut day = start_day;

    while day <= end_date {
        if rule.includes(day.weekday()) && in_active_week(anchor_week, day, rule.interval_weeks) {
            if let Some(instant) = resolve_local(tz, day.and_time(wall_clock)) {
                if instant > rule.start_date {
                    occurrences.push(instant);
                }
            }
        }

        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    occurrences
}
