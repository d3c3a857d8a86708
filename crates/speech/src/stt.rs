//! Speech-to-text

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::client::{read_json, SarvamClient};
use crate::SpeechError;

/// An uploaded audio file
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Transcript plus the untouched vendor payload
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub transcript: String,
    pub language_code: String,
    pub raw: Value,
}

impl Transcription {
    fn from_raw(raw: Value) -> Self {
        let transcript = raw
            .get("transcript")
            .and_then(Value::as_str)
            .unwrap_or("No transcript available")
            .to_string();
        let language_code = raw
            .get("language_code")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        Self {
            transcript,
            language_code,
            raw,
        }
    }
}

impl SarvamClient {
    /// Transcribe (and translate to English) an audio file
    pub async fn transcribe(&self, audio: AudioUpload) -> Result<Transcription, SpeechError> {
        let request = self.post("speech-to-text-translate")?;

        let mut file = Part::bytes(audio.bytes).file_name(audio.file_name);
        if let Some(content_type) = audio.content_type.as_deref() {
            file = file
                .mime_str(content_type)
                .map_err(|e| SpeechError::InvalidResponse(format!("bad content type: {}", e)))?;
        }

        let form = Form::new()
            .text("model", self.config.stt_model.clone())
            .text("language_code", "unknown")
            .text("with_timestamps", "false")
            .text("with_diarization", "false")
            .text("num_speakers", self.config.stt_num_speakers.to_string())
            .part("file", file);

        let response = request.multipart(form).send().await?;
        let raw: Value = read_json(response).await?;

        let transcription = Transcription::from_raw(raw);
        tracing::debug!(
            language = %transcription.language_code,
            chars = transcription.transcript.len(),
            "Transcribed audio"
        );
        Ok(transcription)
    }
}
