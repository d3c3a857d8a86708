//! Configuration management for the document QA backend
//!
//! Supports loading configuration from:
//! - TOML/YAML/JSON files under `config/`
//! - Environment variables (`DOCQA__` prefix, `__` separated)
//! - Plain vendor variables for secrets (`COHERE_API_KEY`, `SARVAM_API_KEY`, ...)

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, CohereConfig, FlashConfig, IndexPolicy,
    ObservabilityConfig, RagConfig, RuntimeEnvironment, SarvamConfig, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::FileNotFound(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}

impl From<ConfigError> for docqa_core::Error {
    fn from(err: ConfigError) -> Self {
        docqa_core::Error::Config(err.to_string())
    }
}
