//! Fix generation endpoint

use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Request body for `POST /api/generate-fix`
#[derive(Debug, Deserialize)]
pub struct GenerateFixRequest {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub slogan: String,
    #[serde(default = "default_error_type")]
    pub error_type: String,
}

fn default_error_type() -> String {
    "basic".to_string()
}

#[derive(Debug, Serialize)]
pub struct GenerateFixResponse {
    pub success: bool,
    pub fix: String,
    pub error: String,
    pub slogan: String,
}

/// POST /api/generate-fix
///
/// Both `error` and `slogan` are required; `error_type` only picks the tone.
pub async fn generate_fix(
    State(state): State<AppState>,
    payload: Result<Json<GenerateFixRequest>, JsonRejection>,
) -> ApiResult<Json<GenerateFixResponse>> {
    let Json(request) = payload?;

    if request.error.is_empty() || request.slogan.is_empty() {
        return Err(ApiError::BadRequest("Missing error or slogan".to_string()));
    }

    info!("Generating fix for: {}...", preview(&request.error, 50));

    let generated = state
        .generator
        .generate(&request.error, &request.slogan, &request.error_type)
        .await;

    info!(
        source = ?generated.source,
        "Generated {} character fix",
        generated.fix.chars().count()
    );

    Ok(Json(GenerateFixResponse {
        success: true,
        fix: generated.fix,
        error: request.error,
        slogan: request.slogan,
    }))
}

/// First `max_chars` characters of `text`
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Build fix generation routes
pub fn fix_routes() -> Router<AppState> {
    Router::new().route("/api/generate-fix", post(generate_fix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_respects_char_boundaries() {
        assert_eq!(preview("abc", 50), "abc");
        assert_eq!(preview("héllo wörld", 4), "héll");
    }

    #[test]
    fn test_request_defaults() {
        let request: GenerateFixRequest = serde_json::from_str("{}").unwrap();
        assert!(request.error.is_empty());
        assert!(request.slogan.is_empty());
        assert_eq!(request.error_type, "basic");
    }
}
