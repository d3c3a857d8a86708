//! LLM Backend trait and shared result types

use async_trait::async_trait;
use std::time::Instant;

use crate::prompt::Message;
use crate::LlmError;

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Total generation time (ms)
    pub total_time_ms: u64,
    /// Finish reason
    pub finish_reason: FinishReason,
}

impl GenerationResult {
    pub(crate) fn finished(text: String, finish_reason: FinishReason, started: Instant) -> Self {
        Self {
            text,
            total_time_ms: started.elapsed().as_millis() as u64,
            finish_reason,
        }
    }
}

/// Finish reason
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    /// Blocked by a vendor safety filter
    Filtered,
    Other,
}

impl FinishReason {
    /// Map a vendor finish reason string (`COMPLETE`, `MAX_TOKENS`, `STOP`, `SAFETY`, ...)
    pub fn from_vendor(reason: Option<&str>) -> Self {
        match reason.map(|r| r.to_ascii_uppercase()).as_deref() {
            None | Some("COMPLETE") | Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("ERROR_TOXIC") | Some("BLOCKLIST") => FinishReason::Filtered,
            Some(_) => FinishReason::Other,
        }
    }
}

/// LLM Backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a response
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Builds the shared HTTP client with the configured timeout
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))
}
