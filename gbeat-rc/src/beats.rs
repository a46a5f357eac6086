//! Beat detection from Spotify audio features
//!
//! Raw-audio onset detection is not done here; tempo comes from Spotify
//! (or the configured default) and beats are laid on an even grid.

use gbeat_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tempo assumed when neither Spotify nor the caller provides one
pub const DEFAULT_TEMPO: f64 = 120.0;
pub const DEFAULT_TIME_SIGNATURE: u32 = 4;
const DEFAULT_ENERGY: f64 = 0.5;
const DEFAULT_DANCEABILITY: f64 = 0.5;

/// Subset of Spotify's `audio-features` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl AudioFeatures {
    pub fn energy_or_default(&self) -> f64 {
        self.energy.unwrap_or(DEFAULT_ENERGY)
    }

    pub fn danceability_or_default(&self) -> f64 {
        self.danceability.unwrap_or(DEFAULT_DANCEABILITY)
    }
}

/// Seconds between beats: `60 / tempo`.
///
/// Tempo must be finite and positive.
pub fn beat_interval(tempo: f64) -> Result<f64> {
    if !tempo.is_finite() || tempo <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "tempo must be a positive number of BPM, got {}",
            tempo
        )));
    }
    Ok(60.0 / tempo)
}

/// Rhythm summary derived from audio features
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatInfo {
    pub tempo: f64,
    pub beat_interval: f64,
    pub time_signature: u32,
    pub energy: f64,
    pub danceability: f64,
}

impl BeatInfo {
    pub fn from_features(features: &AudioFeatures) -> Result<Self> {
        Self::with_default_tempo(features, DEFAULT_TEMPO)
    }

    /// Like [`BeatInfo::from_features`] but with a caller-chosen fallback tempo
    pub fn with_default_tempo(features: &AudioFeatures, default_tempo: f64) -> Result<Self> {
        let tempo = features.tempo.unwrap_or(default_tempo);
        let time_signature = features.time_signature.unwrap_or(DEFAULT_TIME_SIGNATURE);
        let info = Self {
            tempo,
            beat_interval: beat_interval(tempo)?,
            time_signature,
            energy: features.energy_or_default(),
            danceability: features.danceability_or_default(),
        };

        tracing::info!(
            "Using audio features: {:.1} BPM, {}/4 time",
            info.tempo,
            info.time_signature
        );
        Ok(info)
    }
}

/// Lazy beat grid `0, interval, 2*interval, ...` below `duration_secs`
pub fn beat_grid(duration_secs: f64, tempo: f64) -> Result<impl Iterator<Item = f64>> {
    let interval = beat_interval(tempo)?;
    let limit = if duration_secs.is_finite() { duration_secs } else { 0.0 };

    Ok((0u64..)
        .map(move |i| i as f64 * interval)
        .take_while(move |t| *t < limit))
}

/// Evenly spaced beat times in `[0, duration_secs)`.
///
/// This is the fallback grid used when no per-beat analysis exists.
pub fn estimated_beat_times(duration_secs: f64, tempo: f64) -> Result<Vec<f64>> {
    Ok(beat_grid(duration_secs, tempo)?.collect())
}
