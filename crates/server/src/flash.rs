//! Gemini Flash chat endpoint
//!
//! Every prompt is appended to the shared conversation history and the whole
//! rendered history is sent as a single user message.

use axum::extract::{rejection::JsonRejection, Json, State};
use serde::{Deserialize, Serialize};

use docqa_core::Turn;
use docqa_llm::PromptBuilder;

use crate::state::AppState;
use crate::{required, ServerError};

/// Substituted when the model returns no text
const EMPTY_RESPONSE: &str = "No response";

#[derive(Debug, Default, Deserialize)]
pub struct FlashRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlashResponse {
    pub response: String,
}

pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<FlashRequest>, JsonRejection>,
) -> Result<Json<FlashResponse>, ServerError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let prompt = required(&request.prompt)
        .ok_or_else(|| ServerError::InvalidRequest("Prompt is required".to_string()))?;

    let backend = state
        .flash
        .clone()
        .ok_or_else(|| ServerError::internal("Flash API key not found"))?;

    // the user turn stays in history even if generation fails
    let context = state.history.push_and_render(Turn::user(prompt));
    let messages = PromptBuilder::new()
        .system(state.system_instruction.clone())
        .user(context)
        .build();

    let result = backend.generate(&messages).await.map_err(|e| {
        tracing::error!(error = %e, model = backend.model_name(), "Flash generation failed");
        ServerError::internal("Failed to generate AI response")
    })?;

    let response = if result.text.is_empty() {
        EMPTY_RESPONSE.to_string()
    } else {
        result.text
    };
    state.history.push(Turn::assistant(response.clone()));

    tracing::debug!(
        history = state.history.len(),
        elapsed_ms = result.total_time_ms,
        "Flash response generated"
    );

    Ok(Json(FlashResponse { response }))
}
