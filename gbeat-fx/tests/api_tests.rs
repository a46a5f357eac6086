//! Integration tests for gbeat-fx API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Fix generation with canned fallbacks
//! - Request validation (missing error/slogan, malformed JSON)
//! - Fix generation through a model (in-process fake chat completion API)

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use gbeat_common::llm::ChatClient;
use gbeat_fx::generator::{FixGenerator, FALLBACK_FIXES, SLOGAN_PLACEHOLDER};
use gbeat_fx::{build_router, AppState};
use serde_json::{json, Value};
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: app that only serves canned fixes
fn setup_app() -> Router {
    build_router(AppState::new(FixGenerator::fallback_only()))
}

/// Test helper: POST a JSON body
fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: serve a fake chat completion API that replies with `reply`
async fn spawn_fake_model(reply: &'static str) -> String {
    let app = Router::new().route(
        "/chat/completions",
        post(move |Json(request): Json<Value>| async move {
            assert_eq!(request["model"], "deepseek-coder");
            assert_eq!(request["messages"][0]["role"], "system");
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": reply}}]
            }))
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "satirical-fix-generator");
    assert_eq!(body["model_available"], false);
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_number());
}

// =============================================================================
// Fix Generation Tests
// =============================================================================

#[tokio::test]
async fn test_generate_fix_with_fallback() {
    let app = setup_app();
    let slogan = "Off by one: Close enough is good enough";

    let request = post_json(
        "/api/generate-fix",
        json!({
            "error": "NullPointerException in UserService.java:42",
            "slogan": slogan,
            "error_type": "basic"
        }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["error"], "NullPointerException in UserService.java:42");
    assert_eq!(body["slogan"], slogan);

    let fix = body["fix"].as_str().unwrap();
    let candidates: Vec<String> = FALLBACK_FIXES
        .iter()
        .map(|t| t.replace(SLOGAN_PLACEHOLDER, slogan))
        .collect();
    assert!(candidates.iter().any(|c| c == fix));
}

#[tokio::test]
async fn test_generate_fix_error_type_is_optional() {
    let app = setup_app();

    let request = post_json(
        "/api/generate-fix",
        json!({"error": "Segfault", "slogan": "Segfault: A journey into the unknown"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_generate_fix_missing_slogan() {
    let app = setup_app();

    let request = post_json("/api/generate-fix", json!({"error": "Segfault"}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Missing error or slogan");
}

#[tokio::test]
async fn test_generate_fix_empty_error() {
    let app = setup_app();

    let request = post_json("/api/generate-fix", json!({"error": "", "slogan": "x"}));
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_fix_malformed_json() {
    let app = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/generate-fix")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
}

// =============================================================================
// Model-backed Generation
// =============================================================================

#[tokio::test]
async fn test_generate_fix_through_model_strips_fences() {
    let base_url =
        spawn_fake_model("Behold:\n```python\ndef fix():\n    return 'synergy'\n```\nTrust me.").await;
    let client = ChatClient::new(base_url, "test-key", "deepseek-coder", Duration::from_secs(5)).unwrap();
    let app = build_router(AppState::new(FixGenerator::new(Some(client))));

    let request = post_json(
        "/api/generate-fix",
        json!({"error": "Deadlock", "slogan": "Deadlock: When threads fall in love forever", "error_type": "chaotic"}),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["fix"], "def fix():\n    return 'synergy'");
}

#[tokio::test]
async fn test_unreachable_model_falls_back() {
    // Nothing listens on this port; the call fails and a canned fix is used
    let client = ChatClient::new(
        "http://127.0.0.1:9",
        "test-key",
        "deepseek-coder",
        Duration::from_millis(500),
    )
    .unwrap();
    let generator = FixGenerator::new(Some(client));
    assert!(generator.model_available());

    let fix = generator.generate("Timeout", "Timeout: Patience is overrated", "business").await;
    assert!(fix.fix.contains("Timeout: Patience is overrated"));
}
