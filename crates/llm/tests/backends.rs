//! Backend tests against in-process vendor stubs

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use docqa_llm::{
    CohereBackend, CohereBackendConfig, FinishReason, GeminiBackend, GeminiConfig, LlmBackend,
    LlmError, Message,
};

type Seen = Arc<Mutex<Option<(HeaderMap, Value)>>>;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn cohere_generate(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    *seen.lock() = Some((headers, body));
    Json(json!({
        "id": "gen-1",
        "generations": [{ "id": "g", "text": " Paris is the capital.", "finish_reason": "COMPLETE" }]
    }))
}

async fn gemini_generate(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    *seen.lock() = Some((headers, body));
    Json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "there" }] },
            "finishReason": "STOP"
        }]
    }))
}

/// The Cohere backend flattens messages into one prompt and sends its sampling settings
#[tokio::test]
async fn test_cohere_generate_request_and_response() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/v1/generate", post(cohere_generate))
        .with_state(seen.clone());
    let endpoint = spawn_stub(router).await;

    let backend = CohereBackend::new(
        CohereBackendConfig::new("co-key")
            .with_endpoint(endpoint)
            .with_max_tokens(100),
    )
    .unwrap();

    let result = backend
        .generate(&[Message::user("What is the capital of France?")])
        .await
        .unwrap();
    assert_eq!(result.text, " Paris is the capital.");
    assert_eq!(result.finish_reason, FinishReason::Stop);
    assert_eq!(backend.model_name(), "command");

    let (headers, body) = seen.lock().take().unwrap();
    assert_eq!(headers["authorization"], "Bearer co-key");
    assert_eq!(headers["x-client-name"], "my_rag_app");
    assert_eq!(body["model"], "command");
    assert_eq!(body["max_tokens"], 100);
    assert_eq!(body["prompt"], "What is the capital of France?");
}

/// Non-success statuses surface as API errors with the vendor text
#[tokio::test]
async fn test_cohere_error_status() {
    let router = Router::new().route(
        "/v1/generate",
        post(|| async { (StatusCode::UNAUTHORIZED, "invalid api token") }),
    );
    let endpoint = spawn_stub(router).await;

    let backend =
        CohereBackend::new(CohereBackendConfig::new("bad").with_endpoint(endpoint)).unwrap();
    match backend.generate(&[Message::user("hi")]).await {
        Err(LlmError::Api(message)) => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid api token"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

/// Gemini receives the system instruction separately and its parts are joined
#[tokio::test]
async fn test_gemini_generate() {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route(
            "/v1beta/models/gemini-1.5-flash:generateContent",
            post(gemini_generate),
        )
        .with_state(seen.clone());
    let endpoint = spawn_stub(router).await;

    let backend =
        GeminiBackend::new(GeminiConfig::new("g-key").with_endpoint(endpoint)).unwrap();
    let result = backend
        .generate(&[
            Message::system("Answer in one sentence."),
            Message::user("User: hi"),
        ])
        .await
        .unwrap();

    assert_eq!(result.text, "Hello there");
    assert_eq!(result.finish_reason, FinishReason::Stop);

    let (headers, body) = seen.lock().take().unwrap();
    assert_eq!(headers["x-goog-api-key"], "g-key");
    assert_eq!(
        body["systemInstruction"]["parts"][0]["text"],
        "Answer in one sentence."
    );
    assert_eq!(body["contents"][0]["parts"][0]["text"], "User: hi");
}

/// A response without candidates is not an error, the text is just empty
#[tokio::test]
async fn test_gemini_empty_candidates() {
    let router = Router::new().route(
        "/v1beta/models/gemini-1.5-flash:generateContent",
        post(|| async { Json(json!({ "candidates": [] })) }),
    );
    let endpoint = spawn_stub(router).await;

    let backend = GeminiBackend::new(GeminiConfig::new("k").with_endpoint(endpoint)).unwrap();
    let result = backend.generate(&[Message::user("hi")]).await.unwrap();
    assert!(result.text.is_empty());
}
