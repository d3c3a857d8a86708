//! Centralized constants for the document QA backend
//!
//! Default endpoints, model names and tuning values live here so the
//! settings defaults and the clients agree on them.

/// Vendor API endpoints
pub mod endpoints {
    /// Cohere REST API (embeddings and generation)
    pub const COHERE: &str = "https://api.cohere.ai";

    /// Google Generative Language API (Gemini)
    pub const GEMINI: &str = "https://generativelanguage.googleapis.com";

    /// Sarvam AI speech and translation API
    pub const SARVAM: &str = "https://api.sarvam.ai";
}

/// Environment variables holding vendor credentials
pub mod env_keys {
    pub const COHERE_API_KEY: &str = "COHERE_API_KEY";
    pub const FLASH_API_KEY: &str = "GOOGLE_GENERATIVE_AI_API_KEY";
    /// Alternate name accepted for the Gemini key
    pub const FLASH_API_KEY_ALT: &str = "FLASH_API_KEY";
    pub const SYSTEM_INSTRUCTION: &str = "SYSTEM_INSTRUCTION";
    pub const SARVAM_API_KEY: &str = "SARVAM_API_KEY";
    /// Selects `config/{env}` on top of `config/default`
    pub const APP_ENV: &str = "DOCQA_ENV";
    /// Prefix for structured overrides, e.g. `DOCQA__SERVER__PORT`
    pub const ENV_PREFIX: &str = "DOCQA";
}

/// Model identifiers
pub mod models {
    pub const COHERE_EMBED: &str = "embed-english-v2.0";
    pub const COHERE_GENERATE: &str = "command";
    pub const GEMINI_FLASH: &str = "gemini-1.5-flash";
    pub const SARVAM_STT: &str = "saaras:v2";
    pub const SARVAM_TRANSLATE: &str = "mayura:v1";
}

/// Retrieval defaults
pub mod rag {
    pub const DEFAULT_DOCS_DIR: &str = "docs";
    pub const DEFAULT_INDEX_PATH: &str = "vectorstore/index.bin";
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
    pub const DEFAULT_TOP_K: usize = 4;
    /// Cohere accepts at most 96 texts per embed call
    pub const MAX_EMBED_BATCH: usize = 96;
}

/// Generation defaults
pub mod generation {
    pub const COHERE_MAX_TOKENS: u32 = 100;
    pub const COHERE_TEMPERATURE: f32 = 0.75;
    pub const DEFAULT_CLIENT_NAME: &str = "my_rag_app";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

/// Speech vendor defaults
pub mod speech {
    pub const SOURCE_LANGUAGE: &str = "en-IN";
    pub const SPEAKER_GENDER: &str = "Male";
    pub const TRANSLATE_MODE: &str = "formal";
    pub const OUTPUT_SCRIPT: &str = "fully-native";
    pub const NUMERALS_FORMAT: &str = "international";
    pub const TTS_AUDIO_FORMAT: &str = "wav";
    pub const TTS_SAMPLE_RATE: u32 = 24000;
}

/// Server defaults
pub mod server {
    pub const DEFAULT_PORT: u16 = 5000;
    pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
    pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
}
