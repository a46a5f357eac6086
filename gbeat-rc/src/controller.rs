//! Rhythm controller
//!
//! Holds the playback state (song, tempo, section, beat counter), turns
//! sections into error types and sends beat triggers to the error
//! generator. Optionally drives triggers itself from a background run.

use gbeat_common::{Error, ErrorType, Result, SectionKind, TriggerPayload};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::beats::{beat_grid, beat_interval, BeatInfo};
use crate::spotify::SpotifyClient;
use crate::structure::{self, section_at_time, SongData, SongSection};
use crate::trigger::ErrorGeneratorClient;

/// Mutable playback state
#[derive(Debug, Clone, Serialize)]
pub struct ControllerState {
    pub current_song: Option<String>,
    pub tempo: f64,
    pub current_section: String,
    pub beat_count: u64,
}

impl ControllerState {
    fn new(tempo: f64) -> Self {
        Self {
            current_song: None,
            tempo,
            current_section: SectionKind::Verse.as_str().to_string(),
            beat_count: 0,
        }
    }
}

/// Result of analyzing a song
#[derive(Debug, Clone, Serialize)]
pub struct SongAnalysis {
    pub tempo: f64,
    pub beat_interval: f64,
    pub time_signature: u32,
    pub structure: Vec<SongSection>,
}

/// Point-in-time view of the controller
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub current_song: Option<String>,
    pub tempo: f64,
    pub current_section: String,
    pub beat_count: u64,
    pub fpga_enabled: bool,
    pub beat_interval_ms: f64,
    pub auto_trigger_active: bool,
}

/// Outcome of a manual beat trigger
#[derive(Debug, Clone, Serialize)]
pub struct BeatTriggerOutcome {
    pub triggered: bool,
    pub error_type: ErrorType,
    pub section: String,
    pub beat: u64,
}

/// Parameters of a background trigger run
#[derive(Debug, Clone)]
pub struct AutoRun {
    pub structure: Vec<SongSection>,
    pub tempo: f64,
    /// Seconds of song to walk
    pub duration: f64,
    pub beats_per_trigger: u64,
}

struct ActiveRun {
    id: Uuid,
    token: CancellationToken,
}

/// Rhythm controller shared by all request handlers
pub struct RhythmController {
    state: RwLock<ControllerState>,
    active_run: Mutex<Option<ActiveRun>>,
    error_generator: ErrorGeneratorClient,
    spotify: Option<SpotifyClient>,
    default_tempo: f64,
    fpga_enabled: bool,
}

impl RhythmController {
    pub fn new(error_generator: ErrorGeneratorClient, default_tempo: f64) -> Self {
        Self {
            state: RwLock::new(ControllerState::new(default_tempo)),
            active_run: Mutex::new(None),
            error_generator,
            spotify: None,
            default_tempo,
            fpga_enabled: false,
        }
    }

    /// Fetch missing audio features and analysis for songs with a Spotify id
    pub fn with_spotify(mut self, spotify: SpotifyClient) -> Self {
        self.spotify = Some(spotify);
        self
    }

    pub fn with_fpga(mut self, enabled: bool) -> Self {
        self.fpga_enabled = enabled;
        self
    }

    pub fn fpga_enabled(&self) -> bool {
        self.fpga_enabled
    }

    pub async fn state(&self) -> ControllerState {
        self.state.read().await.clone()
    }

    /// Analyze a song and make it the current one
    pub async fn analyze_song(&self, mut song: SongData) -> Result<SongAnalysis> {
        self.enrich_from_spotify(&mut song).await;

        let beat_info = BeatInfo::with_default_tempo(&song.audio_features, self.default_tempo)?;
        let structure = structure::analyze(&song);

        let song_name = song.display_name();
        {
            let mut state = self.state.write().await;
            state.tempo = beat_info.tempo;
            if song_name.is_some() {
                state.current_song = song_name.clone();
            }
        }

        info!(
            song = song_name.as_deref().unwrap_or("unknown"),
            tempo = beat_info.tempo,
            sections = structure.len(),
            "Analyzed song"
        );

        Ok(SongAnalysis {
            tempo: beat_info.tempo,
            beat_interval: beat_info.beat_interval,
            time_signature: beat_info.time_signature,
            structure,
        })
    }

    async fn enrich_from_spotify(&self, song: &mut SongData) {
        let (Some(spotify), Some(track_id)) = (&self.spotify, song.spotify_id.clone()) else {
            return;
        };

        if song.audio_features.tempo.is_none() {
            match spotify.audio_features(&track_id).await {
                Ok(features) => song.audio_features = features,
                Err(e) => warn!(track_id = %track_id, error = %e, "Failed to fetch audio features"),
            }
        }

        if song.spotify_analysis.is_none() {
            match spotify.audio_analysis(&track_id).await {
                Ok(analysis) => song.spotify_analysis = analysis,
                Err(e) => warn!(track_id = %track_id, error = %e, "Failed to fetch audio analysis"),
            }
        }
    }

    /// Send a trigger for `beat` in the current section
    pub async fn trigger(&self, error_type: ErrorType, beat: u64) -> bool {
        let payload = {
            let state = self.state.read().await;
            TriggerPayload::new(error_type, beat, state.current_section.clone(), state.tempo)
        };
        self.error_generator.trigger(&payload).await
    }

    /// Manual trigger: enter `section` and fire for `beat`
    pub async fn beat_trigger(&self, section: &str, beat: u64) -> BeatTriggerOutcome {
        let error_type = ErrorType::for_section(section);
        let tempo = self.enter_section(section, beat).await;

        let payload = TriggerPayload::new(error_type, beat, section, tempo);
        let triggered = self.error_generator.trigger(&payload).await;
        BeatTriggerOutcome {
            triggered,
            error_type,
            section: section.to_string(),
            beat,
        }
    }

    /// Record the section and beat; returns the tempo in effect
    async fn enter_section(&self, section: &str, beat: u64) -> f64 {
        let mut state = self.state.write().await;
        if state.current_section != section {
            debug!(from = %state.current_section, to = section, beat = beat, "Section change");
            state.current_section = section.to_string();
        }
        state.beat_count = beat;
        state.tempo
    }

    pub async fn status(&self) -> StatusSnapshot {
        let state = self.state().await;
        let auto_trigger_active = self.active_run.lock().await.is_some();

        StatusSnapshot {
            beat_interval_ms: beat_interval(state.tempo).map(|i| i * 1000.0).unwrap_or(0.0),
            current_song: state.current_song,
            tempo: state.tempo,
            current_section: state.current_section,
            beat_count: state.beat_count,
            fpga_enabled: self.fpga_enabled,
            auto_trigger_active,
        }
    }

    /// Start a background trigger run, cancelling any run in progress
    pub async fn start_auto_trigger(self: &Arc<Self>, run: AutoRun) -> Result<Uuid> {
        if run.beats_per_trigger == 0 {
            return Err(Error::InvalidInput(
                "beats_per_trigger must be at least 1".to_string(),
            ));
        }
        if !run.duration.is_finite() || run.duration < 0.0 {
            return Err(Error::InvalidInput(format!(
                "duration must be a non-negative number of seconds, got {}",
                run.duration
            )));
        }
        let interval = Duration::try_from_secs_f64(beat_interval(run.tempo)?)
            .map_err(|e| Error::InvalidInput(format!("tempo {} too slow: {}", run.tempo, e)))?;

        let id = Uuid::new_v4();
        let token = CancellationToken::new();

        {
            let mut active = self.active_run.lock().await;
            if let Some(previous) = active.take() {
                info!(run_id = %previous.id, "Replacing running auto-trigger run");
                previous.token.cancel();
            }
            *active = Some(ActiveRun {
                id,
                token: token.clone(),
            });
        }

        info!(
            run_id = %id,
            tempo = run.tempo,
            duration = run.duration,
            beats_per_trigger = run.beats_per_trigger,
            "Auto-trigger run started"
        );

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            controller.run_beats(id, run, interval, token).await;
        });

        Ok(id)
    }

    /// Cancel the background run; false when none was active
    pub async fn stop_auto_trigger(&self) -> bool {
        match self.active_run.lock().await.take() {
            Some(run) => {
                run.token.cancel();
                info!(run_id = %run.id, "Auto-trigger run stopped");
                true
            }
            None => false,
        }
    }

    async fn run_beats(&self, id: Uuid, run: AutoRun, interval: Duration, token: CancellationToken) {
        let grid = match beat_grid(run.duration, run.tempo) {
            Ok(grid) => grid,
            Err(e) => {
                warn!(run_id = %id, error = %e, "Auto-trigger run aborted");
                self.finish_run(id).await;
                return;
            }
        };

        let mut triggers = 0u64;
        for (beat, time) in grid.enumerate() {
            if token.is_cancelled() {
                break;
            }

            let beat = beat as u64;
            let section = section_at_time(&run.structure, time);
            self.enter_section(section.as_str(), beat).await;

            if beat > 0 && beat % run.beats_per_trigger == 0 {
                // The run's section, not current_section
                let payload =
                    TriggerPayload::new(section.error_type(), beat, section.as_str(), run.tempo);
                if self.error_generator.trigger(&payload).await {
                    triggers += 1;
                }
            }

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        info!(run_id = %id, triggers = triggers, "Auto-trigger run finished");
        self.finish_run(id).await;
    }

    /// Forget the run if it is still the active one
    async fn finish_run(&self, id: Uuid) {
        let mut active = self.active_run.lock().await;
        if active.as_ref().map(|run| run.id) == Some(id) {
            *active = None;
        }
    }
}
