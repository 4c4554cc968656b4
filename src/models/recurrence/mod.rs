// Recurrence module
// Weekly lesson pattern expanded into concrete instances at creation time

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;
use crate::utils::date::{weekday_from_index, weekday_index};

/// Weekly recurrence pattern for a lesson series.
///
/// `days_of_week` uses Sunday-based indices (0 = Sunday .. 6 = Saturday).
/// The rule is read-only once a series exists; it is only ever expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub start_date: DateTime<Utc>,
    pub days_of_week: BTreeSet<u8>,
    #[serde(default = "default_interval_weeks")]
    pub interval_weeks: u32,
    pub end_date: Option<NaiveDate>,
    pub timezone: Tz,
}

fn default_interval_weeks() -> u32 {
    1
}

impl RecurrenceRule {
    pub fn new(
        start_date: DateTime<Utc>,
        days_of_week: impl IntoIterator<Item = u8>,
        timezone: Tz,
    ) -> Result<Self, CalendarError> {
        let rule = Self {
            start_date,
            days_of_week: days_of_week.into_iter().collect(),
            interval_weeks: 1,
            end_date: None,
            timezone,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_interval_weeks(mut self, interval_weeks: u32) -> Result<Self, CalendarError> {
        self.interval_weeks = interval_weeks;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), CalendarError> {
        if let Some(&bad) = self.days_of_week.iter().find(|&&day| day > 6) {
            return Err(CalendarError::InvalidWeekday(bad));
        }
        if self.interval_weeks == 0 {
            return Err(CalendarError::InvalidInterval);
        }
        Ok(())
    }

    /// Selected weekdays as chrono values, Sunday first
    pub fn weekdays(&self) -> Vec<Weekday> {
        self.days_of_week
            .iter()
            .filter_map(|&day| weekday_from_index(day))
            .collect()
    }

    pub fn includes(&self, weekday: Weekday) -> bool {
        self.days_of_week.contains(&weekday_index(weekday))
    }

    /// An empty weekday set never produces occurrences beyond the seed
    pub fn is_recurring(&self) -> bool {
        !self.days_of_week.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::London;

    fn seed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_weekday() {
        let result = RecurrenceRule::new(seed(), [1, 7], London);
        assert_eq!(result, Err(CalendarError::InvalidWeekday(7)));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let rule = RecurrenceRule::new(seed(), [1], London).unwrap();
        assert_eq!(
            rule.with_interval_weeks(0),
            Err(CalendarError::InvalidInterval)
        );
    }

    #[test]
    fn test_weekdays_are_sunday_first() {
        let rule = RecurrenceRule::new(seed(), [3, 1, 0], London).unwrap();
        assert_eq!(rule.weekdays(), vec![Weekday::Sun, Weekday::Mon, Weekday::Wed]);
        assert!(rule.includes(Weekday::Mon));
        assert!(!rule.includes(Weekday::Tue));
    }

    #[test]
    fn test_empty_rule_is_not_recurring() {
        let rule = RecurrenceRule::new(seed(), Vec::<u8>::new(), London).unwrap();
        assert!(!rule.is_recurring());
    }
}
