//! LLM integration
//!
//! Features:
//! - Backend trait shared by the QA pipeline and the chat endpoint
//! - Cohere `generate` backend (completion style)
//! - Gemini Flash `generateContent` backend (chat style, system instruction)

pub mod backend;
pub mod cohere;
pub mod gemini;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend};
pub use cohere::{CohereBackend, CohereBackendConfig};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use prompt::{Message, PromptBuilder, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for docqa_core::Error {
    fn from(err: LlmError) -> Self {
        docqa_core::Error::Llm(err.to_string())
    }
}
