//! Axum route handlers for schedule generation.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::schedule::generator::{generate_week, GenerateRequest, GenerateResponse};
use crate::state::AppState;

/// POST /api/schedule/generate
///
/// Generates the requested week and merges it into the event log.
pub async fn handle_generate(
    State(state): State<AppState>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = request?;
    let response = generate_week(&state, request).await?;
    Ok(Json(response))
}
