//! Sarvam speech services
//!
//! Thin async client over the Sarvam REST API:
//! - Speech-to-text with translation (`/speech-to-text-translate`)
//! - Text translation (`/translate`)
//! - Text-to-speech (`/text-to-speech`)

pub mod client;
pub mod stt;
pub mod translate;
pub mod tts;

pub use client::{SarvamClient, SarvamClientConfig};
pub use stt::{AudioUpload, Transcription};
pub use translate::TranslateRequest;
pub use tts::SynthesizedAudio;

use serde_json::Value;
use thiserror::Error;

/// Speech errors
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Sarvam API key not configured")]
    MissingApiKey,

    /// Non-success status, with the vendor body (JSON, or the raw text as a string)
    #[error("Sarvam returned {status}: {body}")]
    Vendor { status: u16, body: Value },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No audio data received")]
    NoAudio,

    #[error("Audio decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        SpeechError::Network(err.to_string())
    }
}

impl From<SpeechError> for docqa_core::Error {
    fn from(err: SpeechError) -> Self {
        docqa_core::Error::Speech(err.to_string())
    }
}
