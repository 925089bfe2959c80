//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use tempfile::TempDir;

use crate::calendar::{
    CalendarError, CalendarEvent, CalendarKind, CalendarProvider, CalendarSource,
};
use crate::config::Config;
use crate::events::EventStore;
use crate::llm_client::{ChatModel, LlmError};
use crate::roster::models::TimeWindow;
use crate::roster::{Employee, RosterStore};
use crate::state::AppState;

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// A 9-to-5 employee with a noon lunch window.
pub fn employee(id: &str, email: &str) -> Employee {
    let name = email.split('@').next().filter(|n| !n.is_empty()).unwrap_or("Staff");
    Employee {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        shift: TimeWindow {
            start: hm(9, 0),
            end: hm(17, 0),
        },
        lunch: TimeWindow {
            start: hm(12, 0),
            end: hm(13, 0),
        },
        hours: 40.0,
        abilities: vec!["Reservations".to_string(), "Dispatch".to_string()],
        specialist_task: String::new(),
        specialist_target: 0.0,
        pto: Vec::new(),
        scheduling_notes: String::new(),
    }
}

/// Replays canned replies in order and records every prompt it was sent.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::default(),
        }
    }

    pub fn push_reply(&self, reply: String) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyContent)
    }
}

/// Returns the same entries for every calendar it is asked about.
#[derive(Default)]
pub struct StaticCalendar {
    entries: Vec<CalendarEvent>,
}

impl StaticCalendar {
    pub fn with_entry(id: &str, start: &str, end: &str, attendees: &[&str]) -> Self {
        Self {
            entries: vec![CalendarEvent {
                id: id.to_string(),
                title: "PTO".to_string(),
                start: start.to_string(),
                end: end.to_string(),
                all_day: !start.contains('T'),
                attendees: attendees.iter().map(|a| a.to_string()).collect(),
                kind: CalendarKind::Pto,
            }],
        }
    }
}

#[async_trait]
impl CalendarProvider for StaticCalendar {
    async fn fetch_events(
        &self,
        _source: &CalendarSource,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        Ok(self.entries.clone())
    }
}

/// App state whose three JSON files live in `dir`, with no calendars configured.
pub fn test_state(
    dir: &TempDir,
    llm: Arc<dyn ChatModel>,
    calendar: Arc<dyn CalendarProvider>,
) -> AppState {
    let config = Config {
        openai_api_key: "test-key".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        events_file: dir.path().join("events.json"),
        employees_file: dir.path().join("employees.json"),
        rules_file: dir.path().join("rules.json"),
        calendars: Vec::new(),
        calendar_access_token: None,
        rollover_enabled: false,
    };

    AppState {
        events: EventStore::new(config.events_file.clone()),
        roster: RosterStore::new(config.employees_file.clone(), config.rules_file.clone()),
        llm,
        calendar,
        config,
    }
}
