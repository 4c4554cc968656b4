// Closure module
// Organisation closure dates excluded from recurring series

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date on which the organisation (or one location) is closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureDate {
    pub date: NaiveDate,
    pub location_id: Option<String>,
    #[serde(default)]
    pub applies_to_all_locations: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl ClosureDate {
    /// Closure covering every location
    pub fn all_locations(date: NaiveDate) -> Self {
        Self {
            date,
            location_id: None,
            applies_to_all_locations: true,
            reason: None,
        }
    }

    /// Closure for a single location
    pub fn for_location(date: NaiveDate, location_id: impl Into<String>) -> Self {
        Self {
            date,
            location_id: Some(location_id.into()),
            applies_to_all_locations: false,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Whether this closure blocks a lesson on `date` at `location`.
    ///
    /// A series without a location is not narrowed by any location filter, so
    /// every closure on the date applies to it.
    pub fn applies_to(&self, date: NaiveDate, location: Option<&str>) -> bool {
        if self.date != date {
            return false;
        }
        if self.applies_to_all_locations {
            return true;
        }
        match location {
            None => true,
            Some(location) => self.location_id.as_deref() == Some(location),
        }
    }
}
