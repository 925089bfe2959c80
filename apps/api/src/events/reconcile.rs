//! Event log reconciliation: weekly rollover, duplicate-suppressing merge and
//! point update/delete by `(employeeId, taskId)`.
//!
//! Everything here is a pure function over an in-memory log. `EventStore` wraps each
//! call in a locked read-modify-write of the backing file.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::events::model::{Event, EventKey, EventPatch, MergeOutcome};

// ────────────────────────────────────────────────────────────────────────────
// Weeks
// ────────────────────────────────────────────────────────────────────────────

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub fn is_week_start(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// Events whose `start` falls inside the Monday-start week beginning at `week`.
pub fn events_in_week(log: &[Event], week: NaiveDate) -> Vec<Event> {
    log.iter()
        .filter(|e| week_start(e.start.date()) == week)
        .cloned()
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Rollover
// ────────────────────────────────────────────────────────────────────────────

/// Carries every event from a week before `new_week_start` into that week.
///
/// The event keeps its weekday and the clock time of `start`; `end` keeps the
/// original duration, so an event crossing midnight still crosses it afterwards.
/// Events already in or after the target week are not touched. Returns how many
/// events moved; the length of the log never changes.
pub fn rollover(log: &mut [Event], new_week_start: NaiveDate) -> usize {
    let mut moved = 0;

    for event in log.iter_mut() {
        let start_day = event.start.date();
        let current_week = week_start(start_day);
        if current_week >= new_week_start {
            continue;
        }

        let weekday_offset = start_day - current_week;
        let duration = event.end - event.start;
        let new_date = new_week_start + weekday_offset;

        event.start = new_date.and_time(event.start.time());
        event.end = event.start + duration;
        event.date = new_date;
        moved += 1;
    }

    moved
}

// ────────────────────────────────────────────────────────────────────────────
// Merge
// ────────────────────────────────────────────────────────────────────────────

/// Appends every incoming event whose identity is not already in the log.
///
/// Identity is `(employeeId, taskId)`. Later duplicates inside `incoming` are
/// dropped as well, so the first occurrence wins.
pub fn merge<I>(log: &mut Vec<Event>, incoming: I) -> MergeOutcome
where
    I: IntoIterator<Item = Event>,
{
    let mut seen: HashSet<EventKey> = log.iter().map(Event::key).collect();
    let mut outcome = MergeOutcome::default();

    for event in incoming {
        if seen.insert(event.key()) {
            log.push(event.clone());
            outcome.added.push(event);
        } else {
            outcome.duplicates_skipped += 1;
        }
    }

    outcome
}

/// Merges a freshly generated week followed by externally sourced events.
pub fn merge_generated(
    log: &mut Vec<Event>,
    generated: Vec<Event>,
    external: Vec<Event>,
) -> MergeOutcome {
    merge(log, generated.into_iter().chain(external))
}

// ────────────────────────────────────────────────────────────────────────────
// Point mutations
// ────────────────────────────────────────────────────────────────────────────

/// Applies `patch` to the event matching both identifiers and returns its new value.
///
/// Only supplied, non-empty fields change. A new `start` also moves `date` to
/// `start`'s day. The flag is `false` when the patch left the event as it was.
/// Returns `None` and leaves the log alone when nothing matches.
pub fn update_event(
    log: &mut [Event],
    employee_id: &str,
    task_id: &str,
    patch: &EventPatch,
) -> Option<(Event, bool)> {
    let event = log.iter_mut().find(|e| e.matches(employee_id, task_id))?;
    let before = event.clone();

    if let Some(title) = patch.title.as_deref().filter(|t| !t.trim().is_empty()) {
        event.title = title.to_string();
    }
    if let Some(start) = patch.start {
        event.start = start;
        event.date = start.date();
    }
    if let Some(end) = patch.end {
        event.end = end;
    }

    let changed = *event != before;
    Some((event.clone(), changed))
}

/// Removes every event matching both identifiers. Returns the number removed.
pub fn delete_event(log: &mut Vec<Event>, employee_id: &str, task_id: &str) -> usize {
    let before = log.len();
    log.retain(|e| !e.matches(employee_id, task_id));
    before - log.len()
}
