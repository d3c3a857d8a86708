//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, env_keys, generation, models, rag, server, speech};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// What to do with a persisted index at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IndexPolicy {
    /// Load the persisted index if it verifies, otherwise build and persist
    #[default]
    LoadOrBuild,
    /// Delete any persisted index, rebuild from the documents and persist
    AlwaysRebuild,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,

    /// Document loading, chunking, index and retrieval
    #[serde(default)]
    pub rag: RagConfig,

    /// Cohere embeddings and QA generation
    #[serde(default)]
    pub cohere: CohereConfig,

    /// Gemini Flash chat
    #[serde(default)]
    pub flash: FlashConfig,

    /// Sarvam speech and translation
    #[serde(default)]
    pub sarvam: SarvamConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate structural settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_rag()?;
        self.validate_cohere()?;
        self.validate_flash()?;
        self.validate_sarvam()?;
        Ok(())
    }

    /// The Cohere key is required before anything can be indexed or answered
    pub fn validate_credentials(&self) -> Result<(), ConfigError> {
        match self.cohere.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ConfigError::MissingField(format!(
                "{} (set it in the environment or a .env file)",
                env_keys::COHERE_API_KEY
            ))),
        }
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.max_upload_bytes".to_string(),
                message: "Upload limit must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn validate_rag(&self) -> Result<(), ConfigError> {
        let rag = &self.rag;

        if rag.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.chunk_size".to_string(),
                message: "Chunk size must be at least 1".to_string(),
            });
        }

        if rag.chunk_overlap >= rag.chunk_size {
            return Err(ConfigError::InvalidValue {
                field: "rag.chunk_overlap".to_string(),
                message: format!(
                    "Overlap ({}) must be smaller than chunk size ({})",
                    rag.chunk_overlap, rag.chunk_size
                ),
            });
        }

        if rag.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rag.top_k".to_string(),
                message: "top_k must be at least 1".to_string(),
            });
        }

        if rag.index_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "rag.index_path".to_string(),
                message: "Index path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_cohere(&self) -> Result<(), ConfigError> {
        let cohere = &self.cohere;

        if cohere.embed_batch_size == 0 || cohere.embed_batch_size > rag::MAX_EMBED_BATCH {
            return Err(ConfigError::InvalidValue {
                field: "cohere.embed_batch_size".to_string(),
                message: format!(
                    "Must be between 1 and {}, got {}",
                    rag::MAX_EMBED_BATCH,
                    cohere.embed_batch_size
                ),
            });
        }

        if !(0.0..=5.0).contains(&cohere.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "cohere.temperature".to_string(),
                message: format!("Must be between 0.0 and 5.0, got {}", cohere.temperature),
            });
        }

        if cohere.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cohere.max_tokens".to_string(),
                message: "max_tokens must be at least 1".to_string(),
            });
        }

        if cohere.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cohere.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_flash(&self) -> Result<(), ConfigError> {
        if self.flash.history_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "flash.history_capacity".to_string(),
                message: "History must keep at least one entry".to_string(),
            });
        }

        if self.flash.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "flash.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_sarvam(&self) -> Result<(), ConfigError> {
        if self.sarvam.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sarvam.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.sarvam.tts_sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sarvam.tts_sample_rate".to_string(),
                message: "Sample rate must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound for a whole request, vendor round trip included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Largest accepted request body (audio uploads)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins, empty means `http://localhost:3000`
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    server::DEFAULT_PORT
}
fn default_request_timeout() -> u64 {
    120
}
fn default_max_upload_bytes() -> usize {
    server::DEFAULT_MAX_UPLOAD_BYTES
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Directory scanned for `.pdf` files
    #[serde(default = "default_docs_dir")]
    pub docs_dir: String,

    /// Persisted index artifact, the checksum lives next to it
    #[serde(default = "default_index_path")]
    pub index_path: String,

    #[serde(default)]
    pub index_policy: IndexPolicy,

    /// Chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared by consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_docs_dir() -> String {
    rag::DEFAULT_DOCS_DIR.to_string()
}
fn default_index_path() -> String {
    rag::DEFAULT_INDEX_PATH.to_string()
}
fn default_chunk_size() -> usize {
    rag::DEFAULT_CHUNK_SIZE
}
fn default_chunk_overlap() -> usize {
    rag::DEFAULT_CHUNK_OVERLAP
}
fn default_top_k() -> usize {
    rag::DEFAULT_TOP_K
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            index_path: default_index_path(),
            index_policy: IndexPolicy::default(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

/// Cohere configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohereConfig {
    /// Defaults to `COHERE_API_KEY`
    #[serde(default = "default_cohere_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_cohere_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    #[serde(default = "default_generate_model")]
    pub generate_model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Sent as `X-Client-Name`
    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_cohere_api_key() -> Option<String> {
    env_secret(env_keys::COHERE_API_KEY)
}
fn default_cohere_endpoint() -> String {
    endpoints::COHERE.to_string()
}
fn default_embed_model() -> String {
    models::COHERE_EMBED.to_string()
}
fn default_generate_model() -> String {
    models::COHERE_GENERATE.to_string()
}
fn default_max_tokens() -> u32 {
    generation::COHERE_MAX_TOKENS
}
fn default_temperature() -> f32 {
    generation::COHERE_TEMPERATURE
}
fn default_client_name() -> String {
    generation::DEFAULT_CLIENT_NAME.to_string()
}
fn default_embed_batch_size() -> usize {
    rag::MAX_EMBED_BATCH
}
fn default_timeout_seconds() -> u64 {
    generation::DEFAULT_TIMEOUT_SECS
}

impl Default for CohereConfig {
    fn default() -> Self {
        Self {
            api_key: default_cohere_api_key(),
            endpoint: default_cohere_endpoint(),
            embed_model: default_embed_model(),
            generate_model: default_generate_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            client_name: default_client_name(),
            embed_batch_size: default_embed_batch_size(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Gemini Flash configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Defaults to `GOOGLE_GENERATIVE_AI_API_KEY`, then `FLASH_API_KEY`
    #[serde(default = "default_flash_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_flash_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_flash_api_version")]
    pub api_version: String,

    #[serde(default = "default_flash_model")]
    pub model: String,

    /// Defaults to `SYSTEM_INSTRUCTION`
    #[serde(default = "default_system_instruction")]
    pub system_instruction: Option<String>,

    /// Entries kept in the chat history
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_flash_api_key() -> Option<String> {
    env_secret(env_keys::FLASH_API_KEY).or_else(|| env_secret(env_keys::FLASH_API_KEY_ALT))
}
fn default_flash_endpoint() -> String {
    endpoints::GEMINI.to_string()
}
fn default_flash_api_version() -> String {
    "v1beta".to_string()
}
fn default_flash_model() -> String {
    models::GEMINI_FLASH.to_string()
}
fn default_system_instruction() -> Option<String> {
    env_secret(env_keys::SYSTEM_INSTRUCTION)
}
fn default_history_capacity() -> usize {
    docqa_core::DEFAULT_HISTORY_CAPACITY
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            api_key: default_flash_api_key(),
            endpoint: default_flash_endpoint(),
            api_version: default_flash_api_version(),
            model: default_flash_model(),
            system_instruction: default_system_instruction(),
            history_capacity: default_history_capacity(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Sarvam configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SarvamConfig {
    /// Defaults to `SARVAM_API_KEY`
    #[serde(default = "default_sarvam_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_sarvam_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    #[serde(default = "default_stt_num_speakers")]
    pub stt_num_speakers: u32,

    #[serde(default = "default_translate_model")]
    pub translate_model: String,

    #[serde(default = "default_source_language")]
    pub translate_source_language: String,

    #[serde(default = "default_speaker_gender")]
    pub translate_speaker_gender: String,

    #[serde(default = "default_translate_mode")]
    pub translate_mode: String,

    #[serde(default = "default_output_script")]
    pub translate_output_script: String,

    #[serde(default = "default_numerals_format")]
    pub translate_numerals_format: String,

    #[serde(default = "default_tts_audio_format")]
    pub tts_audio_format: String,

    #[serde(default = "default_tts_sample_rate")]
    pub tts_sample_rate: u32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_sarvam_api_key() -> Option<String> {
    env_secret(env_keys::SARVAM_API_KEY)
}
fn default_sarvam_endpoint() -> String {
    endpoints::SARVAM.to_string()
}
fn default_stt_model() -> String {
    models::SARVAM_STT.to_string()
}
fn default_stt_num_speakers() -> u32 {
    1
}
fn default_translate_model() -> String {
    models::SARVAM_TRANSLATE.to_string()
}
fn default_source_language() -> String {
    speech::SOURCE_LANGUAGE.to_string()
}
fn default_speaker_gender() -> String {
    speech::SPEAKER_GENDER.to_string()
}
fn default_translate_mode() -> String {
    speech::TRANSLATE_MODE.to_string()
}
fn default_output_script() -> String {
    speech::OUTPUT_SCRIPT.to_string()
}
fn default_numerals_format() -> String {
    speech::NUMERALS_FORMAT.to_string()
}
fn default_tts_audio_format() -> String {
    speech::TTS_AUDIO_FORMAT.to_string()
}
fn default_tts_sample_rate() -> u32 {
    speech::TTS_SAMPLE_RATE
}

impl Default for SarvamConfig {
    fn default() -> Self {
        Self {
            api_key: default_sarvam_api_key(),
            endpoint: default_sarvam_endpoint(),
            stt_model: default_stt_model(),
            stt_num_speakers: default_stt_num_speakers(),
            translate_model: default_translate_model(),
            translate_source_language: default_source_language(),
            translate_speaker_gender: default_speaker_gender(),
            translate_mode: default_translate_mode(),
            translate_output_script: default_output_script(),
            translate_numerals_format: default_numerals_format(),
            tts_audio_format: default_tts_audio_format(),
            tts_sample_rate: default_tts_sample_rate(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Non-empty value of an environment variable
fn env_secret(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Load settings from `config/` and the environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (`DOCQA__SECTION__KEY`)
/// 2. config/{env}.{toml,yaml,json} (if env specified)
/// 3. config/default.{toml,yaml,json}
/// 4. Built-in defaults (vendor keys from their plain environment variables)
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Same as [`load_settings`] with an explicit config directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false));

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&dir.join(env_name).to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(env_keys::ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
