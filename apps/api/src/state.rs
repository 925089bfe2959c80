use std::sync::Arc;

use crate::calendar::CalendarProvider;
use crate::config::Config;
use crate::events::EventStore;
use crate::llm_client::ChatModel;
use crate::roster::RosterStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub events: EventStore,
    pub roster: RosterStore,
    /// Default: `LlmClient` (gpt-4o).
    pub llm: Arc<dyn ChatModel>,
    /// Google Calendar when an access token is configured, `NoCalendar` otherwise.
    pub calendar: Arc<dyn CalendarProvider>,
    pub config: Config,
}
