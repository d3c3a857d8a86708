//! Sarvam client and its configuration

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::SpeechError;

/// Sarvam client configuration
#[derive(Debug, Clone)]
pub struct SarvamClientConfig {
    /// `None` or blank disables every call with [`SpeechError::MissingApiKey`]
    pub api_key: Option<String>,
    pub endpoint: String,
    pub stt_model: String,
    pub stt_num_speakers: u32,
    pub translate_model: String,
    pub source_language: String,
    pub speaker_gender: String,
    pub mode: String,
    pub output_script: String,
    pub numerals_format: String,
    pub audio_format: String,
    pub sample_rate: u32,
    pub timeout: Duration,
}

impl Default for SarvamClientConfig {
    fn default() -> Self {
        Self::from(&docqa_config::SarvamConfig::default())
    }
}

impl From<&docqa_config::SarvamConfig> for SarvamClientConfig {
    fn from(config: &docqa_config::SarvamConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            stt_model: config.stt_model.clone(),
            stt_num_speakers: config.stt_num_speakers,
            translate_model: config.translate_model.clone(),
            source_language: config.translate_source_language.clone(),
            speaker_gender: config.translate_speaker_gender.clone(),
            mode: config.translate_mode.clone(),
            output_script: config.translate_output_script.clone(),
            numerals_format: config.translate_numerals_format.clone(),
            audio_format: config.tts_audio_format.clone(),
            sample_rate: config.tts_sample_rate,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

impl SarvamClientConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Sarvam REST client
#[derive(Debug, Clone)]
pub struct SarvamClient {
    pub(crate) client: Client,
    pub(crate) config: SarvamClientConfig,
}

impl SarvamClient {
    pub fn new(config: SarvamClientConfig) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SpeechError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SarvamClientConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_ok()
    }

    pub(crate) fn api_key(&self) -> Result<&str, SpeechError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(SpeechError::MissingApiKey)
    }

    /// Authenticated POST to `{endpoint}/{path}`
    pub(crate) fn post(&self, path: &str) -> Result<RequestBuilder, SpeechError> {
        let url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path);
        Ok(self
            .client
            .post(url)
            .header("api-subscription-key", self.api_key()?))
    }
}

/// Decode a success body, or turn a failure status into [`SpeechError::Vendor`]
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SpeechError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        tracing::debug!(status = status.as_u16(), body = %body, "Sarvam call failed");
        return Err(SpeechError::Vendor {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&text).map_err(|e| SpeechError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_settings() {
        let config = SarvamClientConfig::new(Some("k".to_string()));
        assert_eq!(config.stt_model, "saaras:v2");
        assert_eq!(config.stt_num_speakers, 1);
        assert_eq!(config.translate_model, "mayura:v1");
        assert_eq!(config.source_language, "en-IN");
        assert_eq!(config.audio_format, "wav");
        assert_eq!(config.sample_rate, 24000);
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let client = SarvamClient::new(SarvamClientConfig::new(Some("  ".to_string()))).unwrap();
        assert!(!client.has_api_key());
        assert!(matches!(client.post("translate"), Err(SpeechError::MissingApiKey)));

        let client = SarvamClient::new(SarvamClientConfig::new(None)).unwrap();
        assert!(!client.has_api_key());
    }
}
