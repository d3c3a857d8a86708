//! HTTP Endpoints
//!
//! Router construction, CORS, health and the document QA endpoint.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Json, State},
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use docqa_config::constants::server::DEFAULT_CORS_ORIGIN;

use crate::state::AppState;
use crate::{flash, required, speech, ServerError};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.get_config();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.request_timeout_seconds);
    let body_limit = config.server.max_upload_bytes;
    drop(config);

    Router::new()
        .route("/health", get(health_check))
        .route("/query", post(query))
        .route("/flash", post(flash::generate))
        .route("/transcribe", post(speech::transcribe))
        .route("/translate", post(speech::translate))
        .route("/tts", post(speech::text_to_speech))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer
/// - If cors_origins is empty (or all invalid), allows the local frontend
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let mut parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEFAULT_CORS_ORIGIN);
        parsed_origins.push(HeaderValue::from_static(DEFAULT_CORS_ORIGIN));
    }

    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let index = state.qa.index();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "index": {
            "chunks": index.len(),
            "dimension": index.dimension(),
        },
        "vendors": {
            "flash": state.flash.is_some(),
            "sarvam": state.sarvam.has_api_key(),
        }
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
}

/// Answer a question from the indexed documents
async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ServerError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let query = required(&request.query)
        .ok_or_else(|| ServerError::InvalidRequest("No query provided.".to_string()))?;

    match state.qa.answer(query).await {
        Ok(answer) => {
            tracing::info!(hits = answer.sources.len(), "Answered query");
            Ok(Json(QueryResponse {
                query: query.to_string(),
                answer: answer.answer,
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Query failed");
            Err(ServerError::internal_with("Failed to answer query", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_variants() {
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["not a header\n".to_string()], true);
        let _ = build_cors_layer(&["https://app.example.com".to_string()], true);
        let _ = build_cors_layer(&[], false);
    }
}
