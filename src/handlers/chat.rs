use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::services::conversation;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

// POST /api/chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected chat body");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Content-Type must be application/json".to_string())
            }
            _ => AppError::BadRequest("Invalid JSON body".to_string()),
        }
    })?;

    let message = payload
        .message
        .ok_or_else(|| AppError::BadRequest("Missing required field: message".to_string()))?;

    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }

    let session_id = payload
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    tracing::debug!(session = ?session_id, message = %message, "incoming chat message");

    match conversation::process_message(&state, session_id, message) {
        Ok(reply) => Ok(Json(reply).into_response()),
        Err(e) => {
            tracing::error!(session = ?session_id, error = %e, "chat processing failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Internal server error. Please try again.",
                    "session_id": session_id,
                })),
            )
                .into_response())
        }
    }
}
