use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::CHAT_SYSTEM;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /api/chat
///
/// Free-form question to the model. Nothing is stored.
pub async fn handle_chat(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(request) = request?;
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let response = state
        .llm
        .complete(&request.prompt, CHAT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Chat call failed: {e}")))?;

    Ok(Json(ChatResponse { response }))
}
