//! Sarvam client against in-process vendor stubs

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use docqa_speech::{AudioUpload, SarvamClient, SarvamClientConfig, SpeechError};

type Seen = Arc<Mutex<Option<(HeaderMap, Value)>>>;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(url: String) -> SarvamClient {
    SarvamClient::new(SarvamClientConfig::new(Some("sv-key".to_string())).with_endpoint(url))
        .unwrap()
}

async fn record(State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let reply = match body.get("inputs") {
        Some(_) => json!({ "request_id": "t", "audios": ["UklGRg=="] }),
        None => json!({ "translated_text": "नमस्ते" }),
    };
    *seen.lock() = Some((headers, body));
    Json(reply)
}

async fn stt(headers: HeaderMap, mut multipart: Multipart) -> Json<Value> {
    let mut fields = HashMap::new();
    let mut file = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap().to_string();
            let content_type = field.content_type().unwrap().to_string();
            let bytes = field.bytes().await.unwrap();
            file = Some((file_name, content_type, bytes.len()));
        } else {
            fields.insert(name, field.text().await.unwrap());
        }
    }

    let (file_name, content_type, len) = file.unwrap();
    Json(json!({
        "transcript": "hello world",
        "language_code": "hi-IN",
        "echo": {
            "key": headers["api-subscription-key"].to_str().unwrap(),
            "fields": fields,
            "file": [file_name, content_type, len]
        }
    }))
}

async fn vendor_rejects() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": { "message": "unsupported language" } })),
    )
}

async fn vendor_plain_text() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream down")
}

async fn tts_without_audio() -> Json<Value> {
    Json(json!({ "request_id": "t" }))
}

async fn tts_null_audio() -> Json<Value> {
    Json(json!({ "request_id": "t", "audios": null }))
}

async fn tts_odd_format() -> Json<Value> {
    Json(json!({ "audios": ["UklGRg=="], "audio_format": "wav\r\nX-Injected: 1" }))
}

async fn tts_mp3() -> Json<Value> {
    Json(json!({ "audios": ["SUQz"], "audio_format": "mp3" }))
}

#[tokio::test]
async fn test_transcribe_sends_form_fields() {
    let url = spawn_stub(Router::new().route("/speech-to-text-translate", post(stt))).await;

    let result = client(url)
        .transcribe(AudioUpload {
            file_name: "clip.webm".to_string(),
            content_type: Some("audio/webm".to_string()),
            bytes: vec![1, 2, 3, 4],
        })
        .await
        .unwrap();

    assert_eq!(result.transcript, "hello world");
    assert_eq!(result.language_code, "hi-IN");

    let echo = &result.raw["echo"];
    assert_eq!(echo["key"], "sv-key");
    assert_eq!(
        echo["fields"],
        json!({
            "model": "saaras:v2",
            "language_code": "unknown",
            "with_timestamps": "false",
            "with_diarization": "false",
            "num_speakers": "1"
        })
    );
    assert_eq!(echo["file"], json!(["clip.webm", "audio/webm", 4]));
}

#[tokio::test]
async fn test_translate_hello_to_hindi() {
    let seen: Seen = Arc::default();
    let url = spawn_stub(
        Router::new()
            .route("/translate", post(record))
            .with_state(seen.clone()),
    )
    .await;

    let translated = client(url).translate("Hello", "hi-IN").await.unwrap();
    assert_eq!(translated, "नमस्ते");

    let (headers, body) = seen.lock().clone().unwrap();
    assert_eq!(headers["api-subscription-key"], "sv-key");
    assert_eq!(body["input"], "Hello");
    assert_eq!(body["target_language_code"], "hi-IN");
    assert_eq!(body["model"], "mayura:v1");
}

#[tokio::test]
async fn test_vendor_error_keeps_status_and_body() {
    let url = spawn_stub(Router::new().route("/translate", post(vendor_rejects))).await;

    match client(url).translate("Hello", "xx-XX").await {
        Err(SpeechError::Vendor { status, body }) => {
            assert_eq!(status, 422);
            assert_eq!(body, json!({ "error": { "message": "unsupported language" } }));
        }
        other => panic!("expected vendor error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_vendor_error_with_text_body() {
    let url = spawn_stub(Router::new().route("/text-to-speech", post(vendor_plain_text))).await;

    match client(url).synthesize("hi", "hi-IN").await {
        Err(SpeechError::Vendor { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body, json!("upstream down"));
        }
        other => panic!("expected vendor error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_synthesize_decodes_first_clip() {
    let seen: Seen = Arc::default();
    let url = spawn_stub(
        Router::new()
            .route("/text-to-speech", post(record))
            .with_state(seen.clone()),
    )
    .await;

    let audio = client(url).synthesize("Namaste", "hi-IN").await.unwrap();
    assert_eq!(audio.bytes, b"RIFF".to_vec());
    assert_eq!(audio.content_type(), "audio/wav");

    let (_, body) = seen.lock().clone().unwrap();
    assert_eq!(
        body,
        json!({
            "inputs": ["Namaste"],
            "target_language_code": "hi-IN",
            "audio_format": "wav",
            "sample_rate": 24000
        })
    );
}

#[tokio::test]
async fn test_synthesize_without_audio() {
    let url = spawn_stub(Router::new().route("/text-to-speech", post(tts_without_audio))).await;
    assert!(matches!(
        client(url).synthesize("hi", "hi-IN").await,
        Err(SpeechError::NoAudio)
    ));
}

#[tokio::test]
async fn test_synthesize_with_null_audio() {
    let url = spawn_stub(Router::new().route("/text-to-speech", post(tts_null_audio))).await;
    assert!(matches!(
        client(url).synthesize("hi", "hi-IN").await,
        Err(SpeechError::NoAudio)
    ));
}

#[tokio::test]
async fn test_synthesize_ignores_unknown_vendor_format() {
    let url = spawn_stub(Router::new().route("/text-to-speech", post(tts_odd_format))).await;
    let audio = client(url).synthesize("hi", "hi-IN").await.unwrap();
    assert_eq!(audio.format, "wav");
    assert_eq!(audio.content_type(), "audio/wav");
    assert_eq!(audio.file_name(), "output.wav");
}

#[tokio::test]
async fn test_synthesize_reports_vendor_format() {
    let url = spawn_stub(Router::new().route("/text-to-speech", post(tts_mp3))).await;
    let audio = client(url).synthesize("hi", "hi-IN").await.unwrap();
    assert_eq!(audio.bytes, b"ID3".to_vec());
    assert_eq!(audio.content_type(), "audio/mpeg");
    assert_eq!(audio.file_name(), "output.mp3");
}

#[tokio::test]
async fn test_missing_key_fails_before_any_request() {
    let client = SarvamClient::new(
        SarvamClientConfig::new(None).with_endpoint("http://127.0.0.1:9"),
    )
    .unwrap();
    assert!(matches!(
        client.translate("Hello", "hi-IN").await,
        Err(SpeechError::MissingApiKey)
    ));
}
