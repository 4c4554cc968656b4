use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::closure::ClosureDate;
use crate::utils::date::local_date;

/// Drop candidates whose local date is closed for `location`.
/// Returns the kept instants and how many were skipped.
pub(super) fn filter_closed(
    candidates: Vec<DateTime<Utc>>,
    tz: &Tz,
    location: Option<&str>,
    closures: &[ClosureDate],
) -> (Vec<DateTime<Utc>>, usize) {
    if closures.is_empty() {
        return (candidates, 0);
    }

    let mut by_date: HashMap<NaiveDate, Vec<&ClosureDate>> = HashMap::new();
    for closure in closures {
        by_date.entry(closure.date).or_default().push(closure);
    }

    let total = candidates.len();
    let kept: Vec<DateTime<Utc>> = candidates
        .into_iter()
        .filter(|instant| {
            let date = local_date(tz, *instant);
            !by_date.get(&date).is_some_and(|on_date| {
                on_date
                    .iter()
                    .any(|closure| closure.applies_to(date, location))
            })
        })
        .collect();

    let skipped = total - kept.len();
    (kept, skipped)
}
