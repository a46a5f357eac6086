//! Rhythm mode and manual beat trigger endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use gbeat_common::ErrorType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::AutoRun;
use crate::error::ApiResult;
use crate::plan::BEATS_PER_TRIGGER;
use crate::structure::SongData;
use crate::AppState;

fn default_duration() -> f64 {
    180.0
}

fn default_beats_per_trigger() -> u64 {
    BEATS_PER_TRIGGER
}

fn default_section() -> String {
    "verse".to_string()
}

fn default_beat_num() -> u64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct StartRhythmRequest {
    #[serde(default)]
    pub song_data: SongData,
    /// Seconds
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Walk the song in the background and send triggers
    #[serde(default)]
    pub auto_trigger: bool,
    #[serde(default = "default_beats_per_trigger")]
    pub beats_per_trigger: u64,
}

#[derive(Debug, Serialize)]
pub struct StartRhythmResponse {
    pub success: bool,
    pub message: String,
    pub tempo: f64,
    pub beat_interval: f64,
    pub duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
}

/// POST /api/start-rhythm-mode
pub async fn start_rhythm_mode(
    State(state): State<AppState>,
    payload: Result<Json<StartRhythmRequest>, JsonRejection>,
) -> ApiResult<Json<StartRhythmResponse>> {
    let Json(request) = payload?;
    tracing::info!("Starting rhythm-driven error generation");

    let analysis = state.controller.analyze_song(request.song_data).await?;

    let run_id = if request.auto_trigger {
        let run = AutoRun {
            structure: analysis.structure,
            tempo: analysis.tempo,
            duration: request.duration,
            beats_per_trigger: request.beats_per_trigger,
        };
        Some(state.controller.start_auto_trigger(run).await?)
    } else {
        None
    };

    Ok(Json(StartRhythmResponse {
        success: true,
        message: "Rhythm mode started".to_string(),
        tempo: analysis.tempo,
        beat_interval: analysis.beat_interval,
        duration: request.duration,
        run_id,
    }))
}

#[derive(Debug, Serialize)]
pub struct StopRhythmResponse {
    pub success: bool,
    /// False when no run was active
    pub stopped: bool,
}

/// POST /api/stop-rhythm-mode
pub async fn stop_rhythm_mode(State(state): State<AppState>) -> Json<StopRhythmResponse> {
    Json(StopRhythmResponse {
        success: true,
        stopped: state.controller.stop_auto_trigger().await,
    })
}

#[derive(Debug, Deserialize)]
pub struct BeatTriggerRequest {
    #[serde(default = "default_section")]
    pub section: String,
    #[serde(default = "default_beat_num")]
    pub beat_num: u64,
}

#[derive(Debug, Serialize)]
pub struct BeatTriggerResponse {
    pub success: bool,
    pub triggered: bool,
    pub error_type: ErrorType,
    pub section: String,
    pub beat: u64,
}

/// POST /api/beat-trigger
pub async fn beat_trigger(
    State(state): State<AppState>,
    payload: Result<Json<BeatTriggerRequest>, JsonRejection>,
) -> ApiResult<Json<BeatTriggerResponse>> {
    let Json(request) = payload?;

    let outcome = state
        .controller
        .beat_trigger(&request.section, request.beat_num)
        .await;

    Ok(Json(BeatTriggerResponse {
        success: true,
        triggered: outcome.triggered,
        error_type: outcome.error_type,
        section: outcome.section,
        beat: outcome.beat,
    }))
}

pub fn rhythm_routes() -> Router<AppState> {
    Router::new()
        .route("/api/start-rhythm-mode", post(start_rhythm_mode))
        .route("/api/stop-rhythm-mode", post(stop_rhythm_mode))
        .route("/api/beat-trigger", post(beat_trigger))
}
