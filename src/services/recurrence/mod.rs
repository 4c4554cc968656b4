//! Recurring series expansion.
//!
//! Turns a weekly [`RecurrenceRule`] into the concrete start instants of a
//! lesson series, skipping organisation closure dates and capping the series
//! size. The closure snapshot is fetched by the caller beforehand; expansion
//! performs no I/O.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::models::closure::ClosureDate;
use crate::models::recurrence::RecurrenceRule;
use crate::models::settings::{CalendarSettings, DEFAULT_HORIZON_DAYS, DEFAULT_MAX_SERIES_SIZE};
use crate::utils::date::local_date;

mod closures;
mod weekly;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceLimits {
    /// Most instances a series may contain, seed included
    pub max_series_size: usize,
    /// Horizon used when the rule has no end date
    pub default_horizon_days: i64,
}

impl Default for RecurrenceLimits {
    fn default() -> Self {
        Self {
            max_series_size: DEFAULT_MAX_SERIES_SIZE,
            default_horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl From<&CalendarSettings> for RecurrenceLimits {
    fn from(settings: &CalendarSettings) -> Self {
        Self {
            max_series_size: settings.max_series_size,
            default_horizon_days: settings.default_horizon_days,
        }
    }
}

/// Result of expanding a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesExpansion {
    /// Seed instant first, then future occurrences in chronological order
    pub instants: Vec<DateTime<Utc>>,
    /// Candidates dropped because they fell on a closure date
    pub skipped_count: usize,
    /// Whether the series was truncated to the size limit
    pub capped: bool,
}

impl SeriesExpansion {
    pub fn seed(&self) -> Option<DateTime<Utc>> {
        self.instants.first().copied()
    }

    /// Occurrences after the seed
    pub fn future_occurrences(&self) -> &[DateTime<Utc>] {
        self.instants.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    /// Message for the user when closures or the cap changed the series
    pub fn summary(&self) -> Option<String> {
        match (self.skipped_count, self.capped) {
            (0, false) => None,
            (skipped, false) => Some(format!(
                "{} lessons created; {} skipped for closure dates",
                self.len(),
                skipped
            )),
            (0, true) => Some(format!(
                "Series limited to {} lessons",
                self.len()
            )),
            (skipped, true) => Some(format!(
                "Series limited to {} lessons; {} skipped for closure dates",
                self.len(),
                skipped
            )),
        }
    }
}

/// Last local date the walk covers. A horizon that overflows the calendar
/// ends the walk on the seed date.
pub fn effective_end_date(rule: &RecurrenceRule, limits: &RecurrenceLimits) -> NaiveDate {
    rule.end_date.unwrap_or_else(|| {
        let horizon = Duration::try_days(limits.default_horizon_days)
            .and_then(|span| rule.start_date.checked_add_signed(span))
            .unwrap_or(rule.start_date);
        local_date(&rule.timezone, horizon)
    })
}

/// Expand a series into start instants.
///
/// `location_id` is the series' target location; closures for other
/// locations do not apply to it. With no location every closure on a date
/// applies. An empty weekday set produces the seed alone. When the filtered
/// series exceeds `limits.max_series_size` the chronological prefix is kept.
pub fn expand_series(
    rule: &RecurrenceRule,
    location_id: Option<&str>,
    closures: &[ClosureDate],
    limits: &RecurrenceLimits,
) -> SeriesExpansion {
    let end_date = effective_end_date(rule, limits);
    let candidates = weekly::candidates(rule, end_date);
    let (mut occurrences, skipped_count) =
        closures::filter_closed(candidates, &rule.timezone, location_id, closures);

    let max_future = limits.max_series_size.max(1) - 1;
    let capped = occurrences.len() > max_future;
    if capped {
        occurrences.truncate(max_future);
    }

    if skipped_count > 0 {
        log::info!("Skipped {} occurrences on closure dates", skipped_count);
    }
    if capped {
        log::info!(
            "Series capped at {} instances",
            limits.max_series_size.max(1)
        );
    }

    let mut instants = Vec::with_capacity(occurrences.len() + 1);
    instants.push(rule.start_date);
    instants.extend(occurrences);

    SeriesExpansion {
        instants,
        skipped_count,
        capped,
    }
}
