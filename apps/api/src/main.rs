mod calendar;
mod config;
mod errors;
mod events;
mod llm_client;
mod roster;
mod routes;
mod schedule;
mod state;
mod storage;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::calendar::{CalendarProvider, GoogleCalendarClient, NoCalendar};
use crate::config::Config;
use crate::events::{sweeper, EventStore};
use crate::llm_client::LlmClient;
use crate::roster::RosterStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Scheduler API v{}", env!("CARGO_PKG_VERSION"));

    // File-backed stores
    let events = EventStore::new(config.events_file.clone());
    let roster = RosterStore::new(config.employees_file.clone(), config.rules_file.clone());
    info!("Event log at {}", events.path().display());

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(config.openai_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // External calendars
    let calendar: Arc<dyn CalendarProvider> = match &config.calendar_access_token {
        Some(token) => {
            info!("Google Calendar enabled for {} calendars", config.calendars.len());
            Arc::new(GoogleCalendarClient::new(token.clone())?)
        }
        None => {
            if !config.calendars.is_empty() {
                warn!("Calendar ids are set but GOOGLE_CALENDAR_ACCESS_TOKEN is not; calendars disabled");
            }
            Arc::new(NoCalendar)
        }
    };

    if config.rollover_enabled {
        sweeper::spawn_weekly_rollover(events.clone());
    } else {
        info!("Weekly rollover sweep disabled");
    }

    // Build app state
    let state = AppState {
        events,
        roster,
        llm,
        calendar,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
