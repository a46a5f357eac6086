//! gbeat-fx library - Satirical Fix Generator
//!
//! Turns an error message and a slogan into an absurd code "fix",
//! using a hosted code model when one is configured.

pub mod api;
pub mod config;
pub mod error;
pub mod generator;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

use crate::generator::FixGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: FixGenerator,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(generator: FixGenerator) -> Self {
        Self {
            generator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::fix_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
