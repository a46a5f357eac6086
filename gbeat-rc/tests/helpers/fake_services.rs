//! Fake upstream services bound to 127.0.0.1:0

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gbeat_common::TriggerPayload;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Error generator that accepts every trigger and remembers it
pub struct FakeErrorGenerator {
    pub url: String,
    received: Arc<Mutex<Vec<TriggerPayload>>>,
}

impl FakeErrorGenerator {
    pub async fn start() -> Self {
        let received = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route("/health", get(|| async { Json(json!({"status": "healthy"})) }))
            .route(
                "/api/rhythm-trigger",
                post(
                    |State(received): State<Arc<Mutex<Vec<TriggerPayload>>>>,
                     Json(payload): Json<TriggerPayload>| async move {
                        let beat = payload.beat;
                        received.lock().unwrap().push(payload);
                        Json(json!({
                            "success": true,
                            "message": format!("Error generated for beat {}", beat)
                        }))
                    },
                ),
            )
            .with_state(Arc::clone(&received));

        Self {
            url: serve(app).await,
            received,
        }
    }

    pub fn triggers(&self) -> Vec<TriggerPayload> {
        self.received.lock().unwrap().clone()
    }

    pub fn beats(&self) -> Vec<u64> {
        self.triggers().iter().map(|t| t.beat).collect()
    }
}

#[derive(Clone)]
struct SpotifyState {
    track: Value,
    features: Value,
    analysis: Option<Value>,
    token_requests: Arc<AtomicUsize>,
}

/// Spotify accounts service and Web API in one server
pub struct FakeSpotify {
    pub url: String,
    token_requests: Arc<AtomicUsize>,
}

impl FakeSpotify {
    /// `analysis: None` makes the audio-analysis endpoint answer 403
    pub async fn start(track: Value, features: Value, analysis: Option<Value>) -> Self {
        let token_requests = Arc::new(AtomicUsize::new(0));
        let state = SpotifyState {
            track,
            features,
            analysis,
            token_requests: Arc::clone(&token_requests),
        };

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .route("/v1/tracks/:id", get(track_by_id))
            .route("/v1/audio-features/:id", get(audio_features))
            .route("/v1/audio-analysis/:id", get(audio_analysis))
            .with_state(state);

        Self {
            url: serve(app).await,
            token_requests,
        }
    }

    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "Bearer fake-token")
        .unwrap_or(false)
}

async fn token(State(state): State<SpotifyState>, headers: HeaderMap) -> Response {
    let basic = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Basic "))
        .unwrap_or(false);
    if !basic {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    state.token_requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({"access_token": "fake-token", "token_type": "Bearer", "expires_in": 3600}))
        .into_response()
}

async fn search(
    State(state): State<SpotifyState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let query = params.get("q").cloned().unwrap_or_default();
    let name = state.track["name"].as_str().unwrap_or_default();
    let items = if query.contains(name) {
        vec![state.track.clone()]
    } else {
        Vec::new()
    };
    Json(json!({"tracks": {"items": items}})).into_response()
}

async fn track_by_id(
    State(state): State<SpotifyState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.track["id"] != id.as_str() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(state.track).into_response()
}

async fn audio_features(State(state): State<SpotifyState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.features).into_response()
}

async fn audio_analysis(State(state): State<SpotifyState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.analysis {
        Some(analysis) => Json(analysis).into_response(),
        None => StatusCode::FORBIDDEN.into_response(),
    }
}
