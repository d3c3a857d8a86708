//! Text translation

use serde::{Deserialize, Serialize};

use crate::client::{read_json, SarvamClient};
use crate::SpeechError;

/// Body sent to `/translate`
#[derive(Debug, Clone, Serialize)]
pub struct TranslateRequest<'a> {
    pub input: &'a str,
    pub source_language_code: &'a str,
    pub target_language_code: &'a str,
    pub speaker_gender: &'a str,
    pub mode: &'a str,
    pub model: &'a str,
    pub enable_preprocessing: bool,
    pub output_script: &'a str,
    pub numerals_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translated_text: Option<String>,
}

impl SarvamClient {
    pub(crate) fn translate_request<'a>(
        &'a self,
        input: &'a str,
        target_language_code: &'a str,
    ) -> TranslateRequest<'a> {
        TranslateRequest {
            input,
            source_language_code: &self.config.source_language,
            target_language_code,
            speaker_gender: &self.config.speaker_gender,
            mode: &self.config.mode,
            model: &self.config.translate_model,
            enable_preprocessing: false,
            output_script: &self.config.output_script,
            numerals_format: &self.config.numerals_format,
        }
    }

    /// Translate `input` into the target language; a missing result is empty
    pub async fn translate(
        &self,
        input: &str,
        target_language_code: &str,
    ) -> Result<String, SpeechError> {
        let request = self.post("translate")?;
        let body = self.translate_request(input, target_language_code);

        let response = request.json(&body).send().await?;
        let parsed: TranslateResponse = read_json(response).await?;

        Ok(parsed.translated_text.unwrap_or_default())
    }
}
