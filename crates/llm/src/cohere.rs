//! Cohere Generate Backend
//!
//! Completion-style backend used by the QA pipeline. Messages are flattened
//! into a single prompt and sent to `/v1/generate`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::backend::{http_client, FinishReason, GenerationResult, LlmBackend};
use crate::prompt::{flatten, Message};
use crate::LlmError;

/// Configuration for the Cohere backend
#[derive(Debug, Clone)]
pub struct CohereBackendConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Sent as `X-Client-Name`
    pub client_name: String,
    pub timeout: Duration,
}

impl Default for CohereBackendConfig {
    fn default() -> Self {
        Self::from(&docqa_config::CohereConfig::default())
    }
}

impl From<&docqa_config::CohereConfig> for CohereBackendConfig {
    fn from(config: &docqa_config::CohereConfig) -> Self {
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            model: config.generate_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client_name: config.client_name.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

impl CohereBackendConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Cohere `generate` backend
pub struct CohereBackend {
    config: CohereBackendConfig,
    client: Client,
}

impl CohereBackend {
    pub fn new(config: CohereBackendConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "COHERE_API_KEY not set. Set it via environment or config.".to_string(),
            ));
        }

        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LlmBackend for CohereBackend {
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let started = Instant::now();
        let request = GenerateRequest {
            model: &self.config.model,
            prompt: flatten(messages),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(format!("{}/v1/generate", self.config.endpoint.trim_end_matches('/')))
            .bearer_auth(&self.config.api_key)
            .header("X-Client-Name", &self.config.client_name)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let generation = response
            .generations
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No generations returned".to_string()))?;

        let result = GenerationResult::finished(
            generation.text,
            FinishReason::from_vendor(generation.finish_reason.as_deref()),
            started,
        );

        tracing::debug!(
            model = %self.config.model,
            latency_ms = result.total_time_ms,
            finish = ?result.finish_reason,
            "Cohere generation complete"
        );

        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CohereBackendConfig::new("key");
        assert_eq!(config.model, "command");
        assert_eq!(config.max_tokens, 100);
        assert_eq!(config.endpoint, "https://api.cohere.ai");
    }

    #[test]
    fn test_missing_key_rejected() {
        let config = CohereBackendConfig::new("");
        assert!(matches!(
            CohereBackend::new(config),
            Err(LlmError::Configuration(_))
        ));
    }
}
