use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::ai::faq::generate_response;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

// POST /api/chat
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if payload.question.trim().is_empty() {
        return Err(AppError::BadRequest("question is empty".to_string()));
    }

    let site = state.content.snapshot().map_err(AppError::storage)?;
    let admin_context = state.content.chat_context().map_err(AppError::storage)?;

    let answer = generate_response(state.llm.as_ref(), &payload.question, &admin_context, &site)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "FAQ assistant failed");
            AppError::Ai(e.to_string())
        })?;

    Ok(Json(ChatResponse { answer }))
}
