use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use brevity_llm::{ChatMessage, LLMClient, LLMError, LLMService, Result};
use engine_service::{app_module::AppState, app_router::build_application, config::EngineConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Echoes the source section of a generation prompt, and the current message
/// plus instruction of a chat turn.
struct EchoService;

fn section<'a>(text: &'a str, header: &str) -> Option<&'a str> {
    let start = text.find(header)? + header.len() + 1;
    let rest = &text[start..];
    Some(&rest[..rest.find("\n\n").unwrap_or(rest.len())])
}

#[async_trait]
impl LLMService for EchoService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.contains("UNAUTHORIZED") {
            return Err(LLMError::Unauthorized("API key not valid".to_string()));
        }
        Ok(section(prompt, "# Source text:").unwrap_or_default().to_string())
    }

    async fn chat(&self, _system: &str, messages: &[ChatMessage]) -> Result<String> {
        let turn = &messages.last().unwrap().content;
        let current = section(turn, "# Current message:").unwrap_or_default();
        Ok(match section(turn, "# Edit instruction:") {
            Some(instruction) => format!("{} {}", current, instruction),
            None => current.to_string(),
        })
    }
}

/// Echoes like `EchoService`, but every call takes `delay` to answer.
struct SlowService {
    delay: Duration,
}

#[async_trait]
impl LLMService for SlowService {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        EchoService.generate(prompt).await
    }

    async fn chat(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        EchoService.chat(system, messages).await
    }
}

fn state_with<S>(service: S, llm_timeout_secs: &str) -> (AppState, EngineConfig)
where
    S: LLMService + Send + Sync + 'static,
{
    let config = EngineConfig::from_lookup(|key| match key {
        "API_KEY" => Some("test-key".to_string()),
        "LLM_TIMEOUT_SECS" => Some(llm_timeout_secs.to_string()),
        _ => None,
    })
    .unwrap();
    let client = Arc::new(LLMClient::from_service(service, Some(config.llm.clone())));
    (AppState::new(client, &config), config)
}

fn test_state() -> AppState {
    state_with(EchoService, "180").0
}

fn app(state: AppState) -> Router {
    build_application(state, Duration::from_secs(5))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_and_limits_are_public() {
    let app = app(test_state());

    let (status, body) = call(&app, "GET", "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = call(&app, "GET", "/v1/optimizer/limits", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"min": 30, "max": 500, "default": 500}));

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/count",
        Some(json!({"text": "✨Sale✨\n👍🏽"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"length": 8}));
}

#[tokio::test]
async fn transform_then_refine_round() {
    let app = app(test_state());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "Fresh bread every morning 🥐", "max_length": 40})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Fresh bread every morning 🥐");
    assert_eq!(body["length"], 27);
    assert_eq!(body["max_length"], 40);
    assert_eq!(body["state"], "seeded");
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/refine",
        Some(json!({"session_id": session_id, "instruction": "mention we open at seven"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 40);
    assert_eq!(body["state"], "refining");
    assert_eq!(body["origin"], "refined");
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.last().unwrap()["role"], "assistant");
    assert!(history.iter().all(|entry| entry.get("full_prompt_text").is_none()));
}

#[tokio::test]
async fn stale_session_ids_are_rejected() {
    let app = app(test_state());

    let (_, first) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "First"})),
    )
    .await;
    call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "Second"})),
    )
    .await;

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/refine",
        Some(json!({"session_id": first["session_id"], "instruction": "shorter"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "stale_session");
}

#[tokio::test]
async fn validation_and_auth_errors_have_distinct_statuses() {
    let app = app(test_state());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "hello", "max_length": 29})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "UNAUTHORIZED", "max_length": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn manual_edit_and_reset() {
    let app = app(test_state());
    let (_, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "Original", "max_length": 30})),
    )
    .await;
    let session_id = body["session_id"].clone();

    let (status, body) = call(
        &app,
        "PUT",
        "/v1/optimizer/artifact",
        Some(json!({"session_id": session_id, "text": "x".repeat(35)})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["over_limit"], true);
    assert_eq!(body["origin"], "edited");

    let (status, body) = call(&app, "GET", "/v1/optimizer/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["length"], 35);

    let (status, _) = call(&app, "DELETE", "/v1/optimizer/session", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&app, "GET", "/v1/optimizer/session", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "no_session");
}

#[tokio::test]
async fn concurrent_request_is_turned_away() {
    let state = test_state();
    let app = app(state.clone());

    let _guard = state.service.workbench.lock().await;
    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "busy");
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let app = app(test_state());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "hello", "max_length": 100.5})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/refine",
        Some(json!({"session_id": "not-a-uuid", "instruction": "shorter"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    let (status, body) = call(&app, "POST", "/v1/optimizer/count", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test(start_paused = true)]
async fn request_timeout_covers_generation_and_priming() {
    let (state, config) = state_with(
        SlowService {
            delay: Duration::from_secs(17),
        },
        "20",
    );
    let app = build_application(state, config.request_timeout());

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "Slow but steady 🐢"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "seeded");

    let (status, body) = call(&app, "GET", "/v1/optimizer/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Slow but steady 🐢");
}

#[tokio::test(start_paused = true)]
async fn elapsed_request_is_a_json_gateway_timeout() {
    let (state, _) = state_with(
        SlowService {
            delay: Duration::from_secs(17),
        },
        "20",
    );
    let app = build_application(state, Duration::from_secs(5));

    let (status, body) = call(
        &app,
        "POST",
        "/v1/optimizer/transform",
        Some(json!({"source_text": "Too slow"})),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "timeout");
}
