//! Integration tests for the Gemini client and the plan pipeline.
//!
//! These tests start a mock Gemini endpoint on a random port and drive it
//! through `GeminiClient` and `PlanPipeline` over real HTTP.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use wellplan_rs::prelude::*;
use wellplan_rs::{GenerateContentRequest, GenerationConfig, default_safety_settings};

const API_KEY: &str = "test-key";

/// Scripted Gemini endpoint.
struct MockGemini {
    /// Model list pages, served in order via `pageToken=p{n}`.
    pages: Vec<Value>,
    status: StatusCode,
    reply: Value,
    list_calls: AtomicUsize,
    page_sizes: Mutex<Vec<Option<String>>>,
    /// `(model, body)` of every generate call.
    generated: Mutex<Vec<(String, Value)>>,
}

fn unauthorized(headers: &HeaderMap) -> Option<(StatusCode, Json<Value>)> {
    let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
    (key != Some(API_KEY)).then(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "API key not valid"}})),
        )
    })
}

async fn list_models(
    State(mock): State<Arc<MockGemini>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if let Some(rejection) = unauthorized(&headers) {
        return rejection;
    }
    mock.list_calls.fetch_add(1, Ordering::SeqCst);
    mock.page_sizes
        .lock()
        .unwrap()
        .push(query.get("pageSize").cloned());

    let index: usize = query
        .get("pageToken")
        .and_then(|t| t.strip_prefix('p'))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let mut page = mock.pages.get(index).cloned().unwrap_or_else(|| json!({}));
    if index + 1 < mock.pages.len() {
        page["nextPageToken"] = json!(format!("p{}", index + 1));
    }
    (StatusCode::OK, Json(page))
}

async fn generate_content(
    State(mock): State<Arc<MockGemini>>,
    headers: HeaderMap,
    Path(action): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(rejection) = unauthorized(&headers) {
        return rejection;
    }
    let model = action
        .strip_suffix(":generateContent")
        .unwrap_or(&action)
        .to_string();
    mock.generated.lock().unwrap().push((model, body));
    (mock.status, Json(mock.reply.clone()))
}

async fn spawn_mock(pages: Vec<Value>, status: StatusCode, reply: Value) -> (Arc<MockGemini>, String) {
    let mock = Arc::new(MockGemini {
        pages,
        status,
        reply,
        list_calls: AtomicUsize::new(0),
        page_sizes: Mutex::new(Vec::new()),
        generated: Mutex::new(Vec::new()),
    });
    let router = Router::new()
        .route("/v1beta/models", get(list_models))
        .route("/v1beta/models/{action}", post(generate_content))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (mock, format!("http://{addr}"))
}

fn models(names: &[&str]) -> Value {
    let entries: Vec<Value> = names
        .iter()
        .map(|n| json!({"name": format!("models/{n}"), "supportedGenerationMethods": ["generateContent"]}))
        .collect();
    json!({ "models": entries })
}

fn text_reply(parts: &[&str]) -> Value {
    let parts: Vec<Value> = parts.iter().map(|t| json!({ "text": t })).collect();
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": parts},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 80, "totalTokenCount": 200}
    })
}

fn client(base: &str) -> GeminiClient {
    GeminiClient::with_base_url(API_KEY, base).unwrap()
}

fn request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest::user_prompt(prompt, GenerationConfig::default(), default_safety_settings())
}

// ── GeminiClient ─────────────────────────────────────────────────────

#[tokio::test]
async fn list_models_follows_every_page() {
    let (mock, base) = spawn_mock(
        vec![
            models(&["embedding-001", "gemini-1.0-pro"]),
            models(&["gemini-1.5-pro"]),
            models(&["aqa"]),
        ],
        StatusCode::OK,
        json!({}),
    )
    .await;

    let listed = client(&base).list_models().await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|m| m.id()).collect();
    assert_eq!(ids, ["embedding-001", "gemini-1.0-pro", "gemini-1.5-pro", "aqa"]);
    assert_eq!(mock.list_calls.load(Ordering::SeqCst), 3);
    assert!(
        mock.page_sizes
            .lock()
            .unwrap()
            .iter()
            .all(|s| s.as_deref() == Some("1000"))
    );
}

#[tokio::test]
async fn generate_sends_camel_case_body_and_joins_parts() {
    let (mock, base) = spawn_mock(vec![], StatusCode::OK, text_reply(&["08:00 Water: ", "Drink"])).await;

    let completion = client(&base)
        .generate_content("models/gemini-pro", &request("hello"))
        .await
        .unwrap();
    assert_eq!(completion.text, "08:00 Water: Drink");
    assert_eq!(completion.finish_reason.as_deref(), Some("STOP"));
    assert_eq!(completion.usage.and_then(|u| u.total_token_count), Some(200));

    let generated = mock.generated.lock().unwrap();
    let (model, body) = &generated[0];
    assert_eq!(model, "gemini-pro");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    assert_eq!(body["generationConfig"]["topK"], 1);
    assert_eq!(body["safetySettings"].as_array().map(Vec::len), Some(4));
    assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_MEDIUM_AND_ABOVE");
}

#[tokio::test]
async fn http_status_is_reported() {
    let (_, base) = spawn_mock(vec![], StatusCode::SERVICE_UNAVAILABLE, json!("overloaded")).await;
    let err = client(&base)
        .generate_content("gemini-pro", &request("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Http { status: 503, .. }), "{err:?}");
}

#[tokio::test]
async fn wrong_key_is_an_http_error() {
    let (_, base) = spawn_mock(vec![models(&["gemini-pro"])], StatusCode::OK, json!({})).await;
    let err = GeminiClient::with_base_url("bogus", &base)
        .unwrap()
        .list_models()
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Http { status: 401, .. }), "{err:?}");
}

#[tokio::test]
async fn blocked_prompt_and_empty_candidates() {
    let (_, base) = spawn_mock(
        vec![],
        StatusCode::OK,
        json!({"promptFeedback": {"blockReason": "SAFETY"}}),
    )
    .await;
    let err = client(&base)
        .generate_content("gemini-pro", &request("x"))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Blocked("SAFETY".into()));

    let (_, base) = spawn_mock(vec![], StatusCode::OK, json!({"candidates": []})).await;
    let err = client(&base)
        .generate_content("gemini-pro", &request("x"))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::EmptyResponse("gemini-pro".into()));
}

#[tokio::test]
async fn error_body_is_an_api_error() {
    let (_, base) = spawn_mock(
        vec![],
        StatusCode::OK,
        json!({"error": {"message": "model not found"}}),
    )
    .await;
    let err = client(&base)
        .generate_content("gemini-pro", &request("x"))
        .await
        .unwrap_err();
    assert_eq!(err, ServiceError::Api("model not found".into()));
}

// ── Pipeline over HTTP ───────────────────────────────────────────────

fn pipeline_provider(base: &str) -> PlanProvider {
    PlanProvider::new(Arc::new(client(base)), PlanProviderConfig::default())
}

fn fever() -> Vec<String> {
    vec!["Fever".to_string()]
}

#[tokio::test]
async fn pipeline_uses_first_available_backend() {
    let plan = "General wellness advice, not medical advice.\n\n07:00 Water: Warm water\n12:30 Food: Soup";
    let (mock, base) = spawn_mock(
        vec![models(&["gemini-1.5-pro"]), models(&["gemini-1.0-pro"])],
        StatusCode::OK,
        text_reply(&[plan]),
    )
    .await;
    let provider = pipeline_provider(&base);
    let warnings = WarningCollector::new();

    let result = PlanPipeline::new(&provider)
        .with_event_handler(&warnings)
        .run(&fever(), &Profile::default())
        .await;

    assert_eq!(result.raw_text, plan);
    assert_eq!(result.reminders.len(), 3);
    assert!(warnings.warnings().is_empty());

    let generated = mock.generated.lock().unwrap();
    assert_eq!(generated.len(), 1);
    assert_eq!(generated[0].0, "gemini-1.0-pro");
    let prompt = generated[0].1["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default();
    assert!(prompt.contains("User reports these symptoms: Fever."));
}

#[tokio::test]
async fn models_without_generate_content_are_skipped() {
    let page = json!({"models": [
        {"name": "models/gemini-pro", "supportedGenerationMethods": ["embedContent"]},
        {"name": "models/gemini-1.0-pro", "supportedGenerationMethods": ["generateContent", "countTokens"]}
    ]});
    let (mock, base) = spawn_mock(vec![page], StatusCode::OK, text_reply(&["09:00 Rest: Nap"])).await;
    let provider = pipeline_provider(&base);

    let text = provider.generate("prompt", &NoopHandler).await;

    assert_eq!(text, "09:00 Rest: Nap");
    assert_eq!(mock.generated.lock().unwrap()[0].0, "gemini-1.0-pro");
}

#[tokio::test]
async fn pipeline_falls_back_when_no_model_matches() {
    let (mock, base) = spawn_mock(vec![models(&["embedding-001"])], StatusCode::OK, json!({})).await;
    let provider = pipeline_provider(&base);
    let warnings = WarningCollector::new();

    let result = PlanPipeline::new(&provider)
        .with_event_handler(&warnings)
        .run(&fever(), &Profile::default())
        .await;

    assert_eq!(result.raw_text, CANNED_PLAN);
    assert_eq!(warnings.warnings(), vec![PlanWarning::ModelsUnavailable]);
    assert!(mock.generated.lock().unwrap().is_empty());
}

#[tokio::test]
async fn pipeline_falls_back_on_server_error() {
    let (_, base) = spawn_mock(
        vec![models(&["gemini-pro"])],
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": {"message": "internal"}}),
    )
    .await;
    let provider = pipeline_provider(&base);
    let warnings = WarningCollector::new();

    let result = PlanPipeline::new(&provider)
        .with_event_handler(&warnings)
        .run(&fever(), &Profile::default())
        .await;

    assert_eq!(result.raw_text, CANNED_PLAN);
    assert_eq!(result.reminders.len(), 9);
    assert_eq!(warnings.warnings(), vec![PlanWarning::TechnicalDifficulty]);
}

#[tokio::test]
async fn unreachable_service_falls_back() {
    // Bind and drop to get a port with nothing listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = pipeline_provider(&format!("http://{addr}"));
    let warnings = WarningCollector::new();
    let text = provider.generate("prompt", &warnings).await;

    assert_eq!(text, CANNED_PLAN);
    assert_eq!(warnings.warnings(), vec![PlanWarning::TechnicalDifficulty]);
}
