//! Text-to-speech

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::Deserialize;
use serde_json::json;

use crate::client::{read_json, SarvamClient};
use crate::SpeechError;

/// Decoded audio returned by the vendor
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    /// File extension, e.g. `wav`
    pub format: String,
}

/// Formats the route knows how to label
const KNOWN_FORMATS: &[&str] = &["wav", "mp3"];

/// Lowercased format if it is one we can put in response headers
fn known_format(format: &str) -> Option<String> {
    let format = format.trim().to_ascii_lowercase();
    KNOWN_FORMATS.contains(&format.as_str()).then_some(format)
}

impl SynthesizedAudio {
    pub fn content_type(&self) -> String {
        match self.format.as_str() {
            "mp3" => "audio/mpeg".to_string(),
            _ => "audio/wav".to_string(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("output.{}", self.format)
    }
}

#[derive(Debug, Deserialize)]
struct TtsResponse {
    #[serde(default)]
    audios: Option<Vec<String>>,
    #[serde(default)]
    audio_format: Option<String>,
}

impl SarvamClient {
    /// Synthesize speech for `text`; only the first returned clip is used
    pub async fn synthesize(
        &self,
        text: &str,
        language_code: &str,
    ) -> Result<SynthesizedAudio, SpeechError> {
        let request = self.post("text-to-speech")?;
        let body = json!({
            "inputs": [text],
            "target_language_code": language_code,
            "audio_format": self.config.audio_format,
            "sample_rate": self.config.sample_rate,
        });

        let response = request.json(&body).send().await?;
        let parsed: TtsResponse = read_json(response).await?;

        let encoded = parsed
            .audios
            .unwrap_or_default()
            .into_iter()
            .next()
            .filter(|a| !a.is_empty())
            .ok_or(SpeechError::NoAudio)?;
        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| SpeechError::Decode(e.to_string()))?;

        let format = match parsed.audio_format.as_deref() {
            Some(reported) => known_format(reported).unwrap_or_else(|| {
                tracing::warn!(reported, "Unknown audio format from vendor, using configured");
                self.configured_format()
            }),
            None => self.configured_format(),
        };

        Ok(SynthesizedAudio { bytes, format })
    }

    fn configured_format(&self) -> String {
        known_format(&self.config.audio_format).unwrap_or_else(|| KNOWN_FORMATS[0].to_string())
    }
}
