//! gbeat-rc library - Rhythm Controller
//!
//! Analyzes song structure and tempo, maps song sections to error types
//! and sends beat-synchronized triggers to the error generator. Also hosts
//! the beat plans used by the `rhythm-demo` binary.

pub mod api;
pub mod beats;
pub mod config;
pub mod controller;
pub mod demo;
pub mod error;
pub mod plan;
pub mod spotify;
pub mod structure;
pub mod trigger;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controller::RhythmController;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<RhythmController>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(controller: RhythmController) -> Self {
        Self {
            controller: Arc::new(controller),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::song_routes())
        .merge(api::rhythm_routes())
        .merge(api::status_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
