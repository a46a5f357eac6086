//! Health check endpoint

use axum::{routing::get, Router};

use crate::AppState;

/// GET /health
///
/// Plain-text "OK"; the demo driver only looks at the status code.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
