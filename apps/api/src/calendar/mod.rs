//! Read-only external calendars (PTO and meetings).
//!
//! Calendar entries are never written back. They are shown as-is through
//! `GET /api/events` and converted into schedule events during generation so the
//! model sees them and the log records them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::events::{timefmt, Event};
use crate::roster::Employee;

pub mod google;
pub mod handlers;

pub use google::GoogleCalendarClient;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Calendar API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid calendar URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalendarKind {
    #[serde(rename = "PTO")]
    Pto,
    Meeting,
}

/// A calendar to read from and what its entries mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSource {
    pub id: String,
    pub kind: CalendarKind,
}

/// One external calendar entry. `start`/`end` are passed through as the provider
/// returned them (a date for all-day entries, a date-time otherwise).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub all_day: bool,
    pub attendees: Vec<String>,
    #[serde(rename = "type")]
    pub kind: CalendarKind,
}

/// Carried in `AppState` as `Arc<dyn CalendarProvider>`.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn fetch_events(
        &self,
        source: &CalendarSource,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;
}

/// Used when no calendar credentials are configured.
pub struct NoCalendar;

#[async_trait]
impl CalendarProvider for NoCalendar {
    async fn fetch_events(
        &self,
        _source: &CalendarSource,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        Ok(Vec::new())
    }
}

/// Reads every configured calendar in order. A calendar that fails is logged and
/// contributes nothing; external events are advisory and never block scheduling.
pub async fn fetch_external_events(
    provider: &dyn CalendarProvider,
    sources: &[CalendarSource],
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let mut all = Vec::new();
    for source in sources {
        match provider.fetch_events(source, time_min, time_max).await {
            Ok(events) => all.extend(events),
            Err(e) => warn!("Failed to fetch calendar {}: {e}", source.id),
        }
    }
    all
}

/// Converts calendar entries into schedule events, one per attendee who is on the
/// roster (matched by email, case-insensitive). `taskId` is the calendar entry id.
pub fn to_schedule_events(entries: &[CalendarEvent], employees: &[Employee]) -> Vec<Event> {
    let mut events = Vec::new();

    for entry in entries {
        let (Some(start), Some(end)) = (
            timefmt::parse_datetime(&entry.start),
            timefmt::parse_datetime(&entry.end),
        ) else {
            warn!("Skipping calendar entry {} with unreadable times", entry.id);
            continue;
        };

        for attendee in &entry.attendees {
            let Some(employee) = employees
                .iter()
                .find(|e| !e.email.is_empty() && e.email.eq_ignore_ascii_case(attendee))
            else {
                continue;
            };

            events.push(Event {
                employee_id: employee.id.clone(),
                title: entry.title.clone(),
                task_id: entry.id.clone(),
                date: start.date(),
                start,
                end,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::employee;

    fn entry(id: &str, start: &str, end: &str, attendees: &[&str]) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: "PTO".to_string(),
            start: start.to_string(),
            end: end.to_string(),
            all_day: !start.contains('T'),
            attendees: attendees.iter().map(|a| a.to_string()).collect(),
            kind: CalendarKind::Pto,
        }
    }

    #[test]
    fn test_conversion_matches_attendees_by_email() {
        let roster = vec![
            employee("E1", "ana@example.com"),
            employee("E2", "ben@example.com"),
        ];
        let entries = vec![entry(
            "cal-1",
            "2025-07-15T09:00:00-04:00",
            "2025-07-15T10:00:00-04:00",
            &["ANA@example.com", "ben@example.com", "visitor@elsewhere.com"],
        )];

        let events = to_schedule_events(&entries, &roster);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].employee_id, "E1");
        assert_eq!(events[1].employee_id, "E2");
        assert!(events.iter().all(|e| e.task_id == "cal-1"));
        assert_eq!(events[0].start.format("%H:%M").to_string(), "09:00");
    }

    #[test]
    fn test_conversion_all_day_entry_spans_midnight_to_midnight() {
        let roster = vec![employee("E1", "ana@example.com")];
        let entries = vec![entry(
            "cal-2",
            "2025-07-16",
            "2025-07-17",
            &["ana@example.com"],
        )];

        let events = to_schedule_events(&entries, &roster);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date.to_string(), "2025-07-16");
        assert_eq!(events[0].end.to_string(), "2025-07-17 00:00:00");
    }

    #[test]
    fn test_conversion_skips_unreadable_and_unmatched() {
        let roster = vec![employee("E1", "")];
        let entries = vec![
            entry("bad", "whenever", "later", &["ana@example.com"]),
            entry("nobody", "2025-07-16", "2025-07-17", &[""]),
        ];
        assert!(to_schedule_events(&entries, &roster).is_empty());
    }

    #[test]
    fn test_calendar_event_serializes_type_tag() {
        let json = serde_json::to_value(entry("c", "2025-07-16", "2025-07-17", &[])).unwrap();
        assert_eq!(json["type"], "PTO");
        assert_eq!(json["allDay"], true);
    }

    struct FailingCalendar;

    #[async_trait]
    impl CalendarProvider for FailingCalendar {
        async fn fetch_events(
            &self,
            source: &CalendarSource,
            _time_min: DateTime<Utc>,
            _time_max: DateTime<Utc>,
        ) -> Result<Vec<CalendarEvent>, CalendarError> {
            if source.kind == CalendarKind::Pto {
                return Err(CalendarError::Api {
                    status: 403,
                    message: "forbidden".to_string(),
                });
            }
            Ok(vec![entry("m-1", "2025-07-16T10:00:00", "2025-07-16T11:00:00", &[])])
        }
    }

    #[tokio::test]
    async fn test_failing_calendar_contributes_nothing() {
        let sources = vec![
            CalendarSource {
                id: "pto".to_string(),
                kind: CalendarKind::Pto,
            },
            CalendarSource {
                id: "meetings".to_string(),
                kind: CalendarKind::Meeting,
            },
        ];
        let now = Utc::now();
        let events = fetch_external_events(&FailingCalendar, &sources, now, now).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "m-1");
    }
}
