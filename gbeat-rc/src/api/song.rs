//! Song analysis endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::controller::SongAnalysis;
use crate::error::{ApiError, ApiResult};
use crate::structure::SongData;
use crate::AppState;

const NO_SONG_DATA: &str = "No song data provided";

#[derive(Debug, Serialize)]
pub struct AnalyzeSongResponse {
    pub success: bool,
    #[serde(flatten)]
    pub analysis: SongAnalysis,
}

/// Body must be a non-empty JSON object
fn parse_song(payload: Result<Json<Value>, JsonRejection>) -> ApiResult<SongData> {
    let Ok(Json(value)) = payload else {
        return Err(ApiError::BadRequest(NO_SONG_DATA.to_string()));
    };

    match &value {
        Value::Object(fields) if !fields.is_empty() => {}
        _ => return Err(ApiError::BadRequest(NO_SONG_DATA.to_string())),
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid song data: {}", e)))
}

/// POST /api/analyze-song
pub async fn analyze_song(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AnalyzeSongResponse>> {
    let song = parse_song(payload)?;
    let analysis = state.controller.analyze_song(song).await?;

    Ok(Json(AnalyzeSongResponse {
        success: true,
        analysis,
    }))
}

pub fn song_routes() -> Router<AppState> {
    Router::new().route("/api/analyze-song", post(analyze_song))
}
