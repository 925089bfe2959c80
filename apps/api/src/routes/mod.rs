pub mod chat;
pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::calendar::handlers as calendar;
use crate::events::handlers as events;
use crate::roster::handlers as roster;
use crate::schedule::handlers as schedule;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/chat", post(chat::handle_chat))
        // Roster
        .route(
            "/api/employees",
            get(roster::handle_list_employees)
                .post(roster::handle_create_employee)
                .patch(roster::handle_update_employee),
        )
        .route("/api/employees/:id", delete(roster::handle_remove_employee))
        .route(
            "/api/rules",
            get(roster::handle_get_rules).post(roster::handle_replace_rules),
        )
        // External calendars (read-only)
        .route("/api/events", get(calendar::handle_list_calendar_events))
        // Schedule event log
        .route("/api/schedule", get(events::handle_list_events))
        .route("/api/schedule/generate", post(schedule::handle_generate))
        .route("/api/schedule/import", post(events::handle_import_events))
        .route("/api/schedule/rollover", post(events::handle_rollover))
        .route(
            "/api/schedule/:employee_id/:task_id",
            patch(events::handle_update_event).delete(events::handle_delete_event),
        )
        .with_state(state)
}
