//! Google Calendar v3 `events.list` client.
//!
//! Authenticates with a pre-issued OAuth bearer token; obtaining and refreshing that
//! token is left to the deployment.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::{CalendarError, CalendarEvent, CalendarProvider, CalendarSource};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "250";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    start: Option<EventTime>,
    #[serde(default)]
    end: Option<EventTime>,
    #[serde(default)]
    attendees: Vec<Attendee>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Attendee {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

impl EventTime {
    fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }

    fn is_date_only(&self) -> bool {
        self.date.is_some() && self.date_time.is_none()
    }
}

impl GoogleEvent {
    fn into_calendar_event(self, source: &CalendarSource) -> Option<CalendarEvent> {
        let start = self.start.as_ref()?;
        let end = self.end.as_ref()?;
        Some(CalendarEvent {
            all_day: start.is_date_only(),
            start: start.value()?.to_string(),
            end: end.value()?.to_string(),
            id: self.id,
            title: self.summary.unwrap_or_default(),
            attendees: self.attendees.into_iter().filter_map(|a| a.email).collect(),
            kind: source.kind,
        })
    }
}

#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Result<Self, CalendarError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            access_token,
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, CalendarError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| CalendarError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| CalendarError::InvalidUrl(self.base_url.clone()))?
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn fetch_events(
        &self,
        source: &CalendarSource,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let url = self.events_url(&source.id)?;
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .bearer_auth(&self.access_token)
                .query(&[
                    ("timeMin", time_min.as_str()),
                    ("timeMax", time_max.as_str()),
                    ("singleEvents", "true"),
                    ("orderBy", "startTime"),
                    ("maxResults", PAGE_SIZE),
                ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GoogleError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(CalendarError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let page: EventsPage = response.json().await?;
            events.extend(
                page.items
                    .into_iter()
                    .filter_map(|e| e.into_calendar_event(source)),
            );

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Fetched {} events from calendar {}", events.len(), source.id);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarKind;

    fn source() -> CalendarSource {
        CalendarSource {
            id: "team@group.calendar.google.com".to_string(),
            kind: CalendarKind::Meeting,
        }
    }

    #[test]
    fn test_events_url_escapes_calendar_id() {
        let client = GoogleCalendarClient::new("token".to_string()).unwrap();
        let url = client.events_url("team#1@group.calendar.google.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team%231@group.calendar.google.com/events"
        );
    }

    #[test]
    fn test_page_maps_timed_and_all_day_events() {
        let json = r#"{
            "items": [
                {
                    "id": "a1",
                    "summary": "Standup",
                    "start": {"dateTime": "2025-07-15T09:00:00-04:00"},
                    "end": {"dateTime": "2025-07-15T09:15:00-04:00"},
                    "attendees": [{"email": "ana@example.com"}, {"displayName": "Room 4"}]
                },
                {
                    "id": "b2",
                    "summary": "Vacation",
                    "start": {"date": "2025-07-16"},
                    "end": {"date": "2025-07-17"}
                },
                {"id": "c3", "status": "cancelled"}
            ]
        }"#;
        let page: EventsPage = serde_json::from_str(json).unwrap();
        let events: Vec<_> = page
            .items
            .into_iter()
            .filter_map(|e| e.into_calendar_event(&source()))
            .collect();

        assert_eq!(events.len(), 2);
        assert!(!events[0].all_day);
        assert_eq!(events[0].attendees, vec!["ana@example.com".to_string()]);
        assert!(events[1].all_day);
        assert_eq!(events[1].start, "2025-07-16");
        assert!(events[1].attendees.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
