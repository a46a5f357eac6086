//! gbeat-sl library - Slogan Server
//!
//! Invents a snarky slogan (and optionally a bureaucratic incident report)
//! for every error the error generator logs.

pub mod api;
pub mod config;
pub mod error;
pub mod slogans;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::slogans::SloganGenerator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: SloganGenerator,
}

impl AppState {
    pub fn new(generator: SloganGenerator) -> Self {
        Self { generator }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::slogan_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
