//! Per-date occurrence expansion for calendar events.
//!
//! An event is active on a date when its anchor date equals that date
//! or its recurrence rule fires there. The anchor always matches
//! directly, even when it does not satisfy a weekly weekday set.
//! Malformed recurrence data excludes only the event that carries it;
//! sibling events are unaffected.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::domain::models::event::Event;
use crate::domain::visibility::ViewerScope;

/// Whether `event` has an occurrence on `date`, ignoring scope.
pub fn matches_date(event: &Event, date: NaiveDate) -> bool {
    if event.start_date == date {
        return true;
    }
    match &event.recurrence {
        Some(rec) => rec.occurs_on(date, event.start_date),
        None => false,
    }
}

/// Display ordering: all-day events first, then timed events by start
/// time ascending, then events with no start time. The key is a total
/// order; ties keep their input order (stable sort).
fn display_order(a: &Event, b: &Event) -> Ordering {
    fn key(e: &Event) -> (bool, bool, Option<&str>) {
        (!e.is_all_day, e.start_time.is_none(), e.start_time.as_deref())
    }
    key(a).cmp(&key(b))
}

/// All occurrences of `events` on `date` visible under `scope`,
/// sorted for display. Pure and idempotent; re-running the same query
/// yields the same sequence.
pub fn occurrences_on<'a>(
    events: &'a [Event],
    date: NaiveDate,
    scope: &ViewerScope,
) -> Vec<&'a Event> {
    let mut matched: Vec<&Event> = events
        .iter()
        .filter(|event| scope.allows(event.child_id.as_deref()))
        .filter(|event| matches_date(event, date))
        .collect();
    matched.sort_by(|a, b| display_order(a, b));
    matched
}

/// Occurrences across an inclusive date range, as repeated single-date
/// queries concatenated in range order. An event recurring across the
/// range appears once per matching date.
pub fn occurrences_in_range<'a>(
    events: &'a [Event],
    start: NaiveDate,
    end: NaiveDate,
    scope: &ViewerScope,
) -> Vec<(NaiveDate, &'a Event)> {
    let mut results = Vec::new();
    let mut date = start;
    while date <= end {
        for event in occurrences_on(events, date, scope) {
            results.push((date, event));
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    results
}
