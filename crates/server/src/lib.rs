//! Document QA Server
//!
//! HTTP endpoints for question answering over the indexed PDFs, Gemini Flash
//! chat and the Sarvam speech proxies.

pub mod flash;
pub mod http;
pub mod speech;
pub mod state;

pub use http::create_router;
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

/// Server errors
///
/// Each variant renders as the JSON body clients already expect.
#[derive(Error, Debug)]
pub enum ServerError {
    /// 400 with `{"error": message}`
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 500 with `{"error": error}` plus `details` when present
    #[error("{error}")]
    Internal {
        error: String,
        details: Option<String>,
    },

    /// Vendor status passed through with `{"error": body}`
    #[error("Upstream returned {status}")]
    Upstream { status: u16, body: Value },

    #[error("Startup error: {0}")]
    Startup(String),
}

impl ServerError {
    pub fn internal(error: impl Into<String>) -> Self {
        ServerError::Internal {
            error: error.into(),
            details: None,
        }
    }

    pub fn internal_with(error: impl Into<String>, details: impl std::fmt::Display) -> Self {
        ServerError::Internal {
            error: error.into(),
            details: Some(details.to_string()),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Upstream { status, .. } => {
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ServerError::Startup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = match &self {
            ServerError::InvalidRequest(message) => json!({ "error": message }),
            ServerError::Internal {
                error,
                details: Some(details),
            } => json!({ "error": error, "details": details }),
            ServerError::Internal { error, details: None } => json!({ "error": error }),
            ServerError::Upstream { body, .. } => json!({ "error": body }),
            ServerError::Startup(message) => json!({ "error": message }),
        };
        (StatusCode::from(self), Json(body)).into_response()
    }
}

/// A required string field: absent, `null` and `""` all count as missing
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}
