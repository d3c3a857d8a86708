//! Sarvam speech proxy endpoints
//!
//! Transcription, translation and text-to-speech. Vendor failures on
//! translate and tts are passed through with the vendor's status.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Json, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use docqa_speech::{AudioUpload, SpeechError};

use crate::state::AppState;
use crate::{required, ServerError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub transcript: String,
    pub language_code: String,
    pub raw_response: Value,
}

/// Pull the `file` part out of a multipart upload
async fn audio_file(mut multipart: Multipart) -> Option<AudioUpload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed multipart upload");
                return None;
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("audio").to_string();
        let content_type = field.content_type().map(str::to_string);
        return match field.bytes().await {
            Ok(bytes) => Some(AudioUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read uploaded audio");
                None
            }
        };
    }
}

pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ServerError> {
    let audio = match multipart {
        Ok(multipart) => audio_file(multipart).await,
        Err(_) => None,
    }
    .ok_or_else(|| ServerError::InvalidRequest("No audio file provided".to_string()))?;

    if !state.sarvam.has_api_key() {
        return Err(ServerError::internal("API key not found"));
    }

    tracing::debug!(file = %audio.file_name, bytes = audio.bytes.len(), "Transcribing upload");

    match state.sarvam.transcribe(audio).await {
        Ok(t) => Ok(Json(TranscribeResponse {
            transcript: t.transcript,
            language_code: t.language_code,
            raw_response: t.raw,
        })),
        Err(e) => {
            tracing::error!(error = %e, "Transcription failed");
            Err(ServerError::internal("Failed to transcribe audio"))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TranslateBody {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub target_language_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

pub async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ServerError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let (Some(input), Some(target)) = (
        required(&request.input),
        required(&request.target_language_code),
    ) else {
        return Err(ServerError::InvalidRequest(
            "Missing required parameters".to_string(),
        ));
    };

    state
        .sarvam
        .translate(input, target)
        .await
        .map(|translated_text| Json(TranslateResponse { translated_text }))
        .map_err(|e| vendor_error(e, "Translation failed"))
}

#[derive(Debug, Default, Deserialize)]
pub struct TtsBody {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

pub async fn text_to_speech(
    State(state): State<AppState>,
    payload: Result<Json<TtsBody>, JsonRejection>,
) -> Result<Response, ServerError> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let (Some(text), Some(language_code)) =
        (required(&request.text), required(&request.language_code))
    else {
        return Err(ServerError::InvalidRequest(
            "Missing text or language_code".to_string(),
        ));
    };

    let audio = state
        .sarvam
        .synthesize(text, language_code)
        .await
        .map_err(|e| match e {
            SpeechError::NoAudio => ServerError::internal("No audio data received"),
            other => vendor_error(other, "TTS conversion failed"),
        })?;

    let headers = [
        (header::CONTENT_TYPE, audio.content_type()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename={}", audio.file_name()),
        ),
        (header::CACHE_CONTROL, "no-cache".to_string()),
        (header::CONTENT_LENGTH, audio.bytes.len().to_string()),
    ];

    Ok((StatusCode::OK, headers, Body::from(audio.bytes)).into_response())
}

/// Vendor statuses pass through; anything else is a 500 with details
fn vendor_error(err: SpeechError, message: &str) -> ServerError {
    tracing::error!(error = %err, "{}", message);
    match err {
        SpeechError::Vendor { status, body } => ServerError::Upstream { status, body },
        other => ServerError::internal_with(message, other),
    }
}
