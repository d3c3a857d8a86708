//! Gemini Flash Backend
//!
//! Chat backend for the `/flash` endpoint. System messages become the
//! `systemInstruction`, user/assistant messages become `contents` with the
//! `user`/`model` roles Gemini expects.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::backend::{http_client, FinishReason, GenerationResult, LlmBackend};
use crate::prompt::{system_instruction, Message, Role};
use crate::LlmError;

/// Configuration for the Gemini backend
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub endpoint: String,
    /// API version path segment (`v1beta` accepts `systemInstruction`)
    pub api_version: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::from(&docqa_config::FlashConfig::default())
    }
}

impl From<&docqa_config::FlashConfig> for GeminiConfig {
    fn from(config: &docqa_config::FlashConfig) -> Self {
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

impl GeminiConfig {
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

    fn url(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.api_version,
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

/// Gemini `generateContent` backend
pub struct GeminiBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "Flash API key not set (GOOGLE_GENERATIVE_AI_API_KEY)".to_string(),
            ));
        }

        let client = http_client(config.timeout)?;
        Ok(Self { config, client })
    }

    fn build_request(messages: &[Message]) -> GenerateContentRequest {
        let contents = messages
            .iter()
            .filter_map(|m| match m.role {
                Role::System => None,
                Role::User => Some(Content::text(Some("user"), &m.content)),
                Role::Assistant => Some(Content::text(Some("model"), &m.content)),
            })
            .collect();

        GenerateContentRequest {
            system_instruction: system_instruction(messages).map(|s| Content::text(None, &s)),
            contents,
        }
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    /// An empty candidate list yields an empty text rather than an error
    async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
        let started = Instant::now();
        let request = Self::build_request(messages);

        let response = self
            .client
            .post(self.config.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let (text, finish_reason) = match response.candidates.into_iter().next() {
            Some(candidate) => {
                let text = candidate
                    .content
                    .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
                    .unwrap_or_default();
                (text, FinishReason::from_vendor(candidate.finish_reason.as_deref()))
            }
            None => (String::new(), FinishReason::Other),
        };

        let result = GenerationResult::finished(text, finish_reason, started);

        tracing::debug!(
            model = %self.config.model,
            latency_ms = result.total_time_ms,
            finish = ?result.finish_reason,
            "Gemini generation complete"
        );

        Ok(result)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
