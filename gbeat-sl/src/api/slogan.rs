//! Slogan endpoint

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use tracing::info;

use crate::error::ApiResult;
use crate::slogans::{ErrorLogRequest, SloganResponse};
use crate::AppState;

/// POST /error-log
///
/// Returns `{emoji, slogan, verbose_desc}` for the logged error.
pub async fn error_log(
    State(state): State<AppState>,
    payload: Result<Json<ErrorLogRequest>, JsonRejection>,
) -> ApiResult<Json<SloganResponse>> {
    let Json(request) = payload?;

    info!("Received error log: {} (GIF: {})", request.message, request.gif_url);
    if !request.user_keywords.is_empty() {
        info!("🔑 User keywords for satirical slogan: {:?}", request.user_keywords);
    }

    let (response, source) = state.generator.generate(&request).await;
    info!("Responded with slogan ({}): {}", source.as_str(), response.slogan);

    Ok(Json(response))
}

/// Build slogan routes
pub fn slogan_routes() -> Router<AppState> {
    Router::new().route("/error-log", post(error_log))
}
