//! Axum route handlers for the schedule event log.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::events::model::{Event, EventPatch, MergeOutcome};
use crate::events::reconcile::{is_week_start, week_start};
use crate::events::store::RolloverReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekQuery {
    pub week_start: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub removed: usize,
}

/// GET /api/schedule?weekStart=YYYY-MM-DD
///
/// The whole log, or only the events of one Monday-start week.
pub async fn handle_list_events(
    State(state): State<AppState>,
    query: Result<Query<WeekQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>, AppError> {
    let Query(query) = query?;
    let events = match query.week_start {
        Some(week) => state.events.list_week(require_monday(week)?).await?,
        None => state.events.list().await?,
    };
    Ok(Json(events))
}

/// POST /api/schedule/import
///
/// Appends events produced elsewhere. Identities already in the log are skipped.
pub async fn handle_import_events(
    State(state): State<AppState>,
    incoming: Result<Json<Vec<Event>>, JsonRejection>,
) -> Result<Json<MergeOutcome>, AppError> {
    let Json(incoming) = incoming?;
    if let Some(bad) = incoming
        .iter()
        .find(|e| e.employee_id.trim().is_empty() || e.task_id.trim().is_empty())
    {
        return Err(AppError::Validation(format!(
            "Event '{}' needs both employeeId and taskId",
            bad.title
        )));
    }
    Ok(Json(state.events.import(incoming).await?))
}

/// POST /api/schedule/rollover?weekStart=YYYY-MM-DD
///
/// Defaults to the current week in server-local time.
pub async fn handle_rollover(
    State(state): State<AppState>,
    query: Result<Query<WeekQuery>, QueryRejection>,
) -> Result<Json<RolloverReport>, AppError> {
    let Query(query) = query?;
    let week = match query.week_start {
        Some(week) => require_monday(week)?,
        None => week_start(Local::now().date_naive()),
    };
    Ok(Json(state.events.rollover(week).await?))
}

/// PATCH /api/schedule/:employee_id/:task_id
pub async fn handle_update_event(
    State(state): State<AppState>,
    Path((employee_id, task_id)): Path<(String, String)>,
    patch: Result<Json<EventPatch>, JsonRejection>,
) -> Result<Json<Event>, AppError> {
    let Json(patch) = patch?;
    state
        .events
        .update(&employee_id, &task_id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(&employee_id, &task_id))
}

/// DELETE /api/schedule/:employee_id/:task_id
pub async fn handle_delete_event(
    State(state): State<AppState>,
    Path((employee_id, task_id)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, AppError> {
    match state.events.delete(&employee_id, &task_id).await? {
        0 => Err(not_found(&employee_id, &task_id)),
        removed => Ok(Json(DeleteResponse { removed })),
    }
}

fn require_monday(week: NaiveDate) -> Result<NaiveDate, AppError> {
    if is_week_start(week) {
        Ok(week)
    } else {
        Err(AppError::Validation(format!("weekStart {week} is not a Monday")))
    }
}

fn not_found(employee_id: &str, task_id: &str) -> AppError {
    AppError::NotFound(format!(
        "No event with employeeId {employee_id} and taskId {task_id}"
    ))
}
