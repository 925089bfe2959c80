use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::calendar::{fetch_external_events, CalendarEvent};
use crate::errors::AppError;
use crate::events::timefmt;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// GET /api/events?start=…&end=…
///
/// PTO and meeting entries from the configured calendars, tagged with their `type`.
pub async fn handle_list_calendar_events(
    State(state): State<AppState>,
    range: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let Query(range) = range?;
    let (Some(start), Some(end)) = (range.start, range.end) else {
        return Err(AppError::Validation(
            "start and end query parameters are required".to_string(),
        ));
    };
    let time_min = parse_bound(&start)?;
    let time_max = parse_bound(&end)?;

    let events = fetch_external_events(
        state.calendar.as_ref(),
        &state.config.calendars,
        time_min,
        time_max,
    )
    .await;

    Ok(Json(events))
}

/// Offsets are honoured; values without one are taken as UTC.
fn parse_bound(raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Ok(dt.with_timezone(&Utc));
    }
    timefmt::parse_datetime(raw)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("'{raw}' is not a valid date or date-time")))
}
