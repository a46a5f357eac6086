//! Controller status endpoint

use axum::{extract::State, routing::get, Json, Router};
use gbeat_common::server::uptime_seconds;
use serde::Serialize;

use crate::controller::StatusSnapshot;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub service: String,
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    pub uptime_seconds: u64,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "rhythm-service".to_string(),
        snapshot: state.controller.status().await,
        uptime_seconds: uptime_seconds(state.startup_time),
    })
}

pub fn status_routes() -> Router<AppState> {
    Router::new().route("/api/status", get(get_status))
}
