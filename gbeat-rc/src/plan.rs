//! Beat plans for the rhythm demo
//!
//! A plan is a list of sections measured in beats, each tagged with the
//! error type to request while it plays. Plans come from Spotify's audio
//! analysis, or from a canonical pop-song layout when no analysis exists.

use gbeat_common::{ErrorType, Result};
use serde::Serialize;
use std::fmt::Write;

use crate::beats::{beat_interval, AudioFeatures, DEFAULT_TEMPO};
use crate::structure::SpotifyAnalysis;

/// Beats between two triggers
pub const BEATS_PER_TRIGGER: u64 = 16;

/// Canonical layout: label, start beat, end beat, error type
const CANONICAL_SECTIONS: [(&str, u64, u64, ErrorType); 10] = [
    ("intro", 0, 8, ErrorType::Basic),
    ("verse", 8, 24, ErrorType::Basic),
    ("pre-chorus", 24, 32, ErrorType::Business),
    ("chorus", 32, 48, ErrorType::Business),
    ("verse", 48, 64, ErrorType::Basic),
    ("pre-chorus", 64, 72, ErrorType::Business),
    ("chorus", 72, 88, ErrorType::Business),
    ("bridge", 88, 104, ErrorType::Chaotic),
    ("chorus", 104, 120, ErrorType::Business),
    ("outro", 120, 128, ErrorType::Philosophical),
];

/// Section of a beat plan; `end_beat` is exclusive
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatSection {
    pub section: String,
    pub start_beat: u64,
    pub end_beat: u64,
    pub error_type: ErrorType,
    /// Spotify detail, present only for analysis-derived sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loudness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl BeatSection {
    fn simulated(section: &str, start_beat: u64, end_beat: u64, error_type: ErrorType) -> Self {
        Self {
            section: section.to_string(),
            start_beat,
            end_beat,
            error_type,
            start_time: None,
            duration: None,
            loudness: None,
            tempo: None,
            confidence: None,
        }
    }

    pub fn contains(&self, beat: u64) -> bool {
        self.start_beat <= beat && beat < self.end_beat
    }

    pub fn beats(&self) -> u64 {
        self.end_beat.saturating_sub(self.start_beat)
    }
}

/// Where a plan's sections came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    /// Canonical layout at the configured tempo
    Simulated,
    /// Canonical layout stretched over a real track's length
    SpotifyTempo,
    /// Spotify audio analysis sections
    SpotifyAnalysis,
}

/// Ordered, non-empty list of beat sections at one tempo
#[derive(Debug, Clone, Serialize)]
pub struct BeatPlan {
    tempo: f64,
    beat_duration: f64,
    source: PlanSource,
    sections: Vec<BeatSection>,
}

/// Label for Spotify section `index` of `total`
pub fn spotify_section_label(index: usize, total: usize, loudness: f64) -> &'static str {
    if index == 0 {
        "intro"
    } else if index + 2 >= total {
        "outro"
    } else if loudness > -10.0 {
        "chorus"
    } else if in_bridge_range(index, total) {
        "bridge"
    } else {
        "verse"
    }
}

/// Error type for Spotify section `index` of `total`
pub fn spotify_error_type(index: usize, total: usize, loudness: f64) -> ErrorType {
    if index == 0 {
        ErrorType::Basic
    } else if index + 2 >= total {
        ErrorType::Philosophical
    } else if in_bridge_range(index, total) && loudness > -8.0 {
        ErrorType::Chaotic
    } else if loudness > -10.0 {
        ErrorType::Business
    } else {
        ErrorType::Basic
    }
}

fn in_bridge_range(index: usize, total: usize) -> bool {
    let start = (total as f64 * 0.5) as usize;
    let end = (total as f64 * 0.75) as usize;
    start <= index && index < end
}

impl BeatPlan {
    /// Canonical 128-beat layout at `tempo`
    pub fn canonical(tempo: f64) -> Result<Self> {
        Ok(Self {
            tempo,
            beat_duration: beat_interval(tempo)?,
            source: PlanSource::Simulated,
            sections: canonical_sections(),
        })
    }

    /// Canonical layout at the track's real tempo, ending with the track.
    ///
    /// The last section is stretched to the track's beat count; on tracks
    /// shorter than the layout, sections past the end are dropped and the
    /// last one left is cut short.
    pub fn tempo_only(tempo: f64, track_duration_ms: u64) -> Result<Self> {
        let beat_duration = beat_interval(tempo)?;
        let total_beats = (track_duration_ms as f64 / 1000.0 / beat_duration) as u64;

        let mut sections: Vec<BeatSection> = canonical_sections()
            .into_iter()
            .filter(|s| s.start_beat < total_beats)
            .collect();
        if let Some(last) = sections.last_mut() {
            last.end_beat = total_beats;
        }

        Ok(Self {
            tempo,
            beat_duration,
            source: PlanSource::SpotifyTempo,
            sections,
        })
    }

    /// Plan from Spotify's audio analysis; canonical layout when the
    /// analysis has no sections
    pub fn from_spotify(analysis: &SpotifyAnalysis, features: &AudioFeatures) -> Result<Self> {
        let tempo = features.tempo.unwrap_or(DEFAULT_TEMPO);
        let beat_duration = beat_interval(tempo)?;

        if analysis.sections.is_empty() {
            tracing::warn!("No sections in Spotify analysis, using canonical layout");
            return Self::canonical(tempo);
        }

        let total = analysis.sections.len();
        let sections = analysis
            .sections
            .iter()
            .enumerate()
            .map(|(index, section)| {
                let start = section.start.unwrap_or(0.0);
                let duration = section.duration.unwrap_or(0.0);
                let loudness = section.loudness.unwrap_or(0.0);
                let start_beat = (start / beat_duration) as u64;

                BeatSection {
                    section: spotify_section_label(index, total, loudness).to_string(),
                    start_beat,
                    end_beat: start_beat + (duration / beat_duration) as u64,
                    error_type: spotify_error_type(index, total, loudness),
                    start_time: Some(start),
                    duration: Some(duration),
                    loudness: Some(loudness),
                    tempo: Some(section.tempo.unwrap_or(tempo)),
                    confidence: Some(section.confidence.unwrap_or(0.0)),
                }
            })
            .collect();

        Ok(Self {
            tempo,
            beat_duration,
            source: PlanSource::SpotifyAnalysis,
            sections,
        })
    }

    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Seconds per beat
    pub fn beat_duration(&self) -> f64 {
        self.beat_duration
    }

    pub fn source(&self) -> PlanSource {
        self.source
    }

    pub fn sections(&self) -> &[BeatSection] {
        &self.sections
    }

    /// Section playing at `beat`: the first containing it, else the last
    pub fn section_at_beat(&self, beat: u64) -> Option<&BeatSection> {
        self.sections
            .iter()
            .find(|s| s.contains(beat))
            .or_else(|| self.sections.last())
    }

    /// End beat of the last section
    pub fn total_beats(&self) -> u64 {
        self.sections.last().map(|s| s.end_beat).unwrap_or(0)
    }

    /// Playing time in seconds
    pub fn total_duration(&self) -> f64 {
        self.total_beats() as f64 * self.beat_duration
    }

    /// Triggers a full run sends, final trigger included
    pub fn expected_triggers(&self, beats_per_trigger: u64) -> u64 {
        self.total_beats() / beats_per_trigger.max(1) + 1
    }

    /// Human-readable section table
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<12} {:>6} {:>6} {:>8} {:>8}  {}",
            "Section", "Start", "End", "Beats", "Seconds", "Error type"
        );
        let _ = writeln!(out, "{}", "-".repeat(60));

        for section in &self.sections {
            let _ = writeln!(
                out,
                "{:<12} {:>6} {:>6} {:>8} {:>8.1}  {}",
                section.section,
                section.start_beat,
                section.end_beat,
                section.beats(),
                section.beats() as f64 * self.beat_duration,
                section.error_type
            );
        }

        let _ = write!(
            out,
            "Total: {} beats, {:.1}s at {:.1} BPM",
            self.total_beats(),
            self.total_duration(),
            self.tempo
        );
        out
    }
}

fn canonical_sections() -> Vec<BeatSection> {
    CANONICAL_SECTIONS
        .iter()
        .map(|&(label, start, end, error_type)| BeatSection::simulated(label, start, end, error_type))
        .collect()
}
