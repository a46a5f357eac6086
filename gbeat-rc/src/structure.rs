//! Song structure analysis
//!
//! Labels the sections of a song (intro, verse, chorus, bridge, outro) from
//! Spotify's audio analysis when available, otherwise from a fixed
//! percentage layout over the track duration.

use gbeat_common::SectionKind;
use serde::{Deserialize, Deserializer, Serialize};

use crate::beats::AudioFeatures;

const DEFAULT_DURATION_MS: f64 = 180_000.0;
const DEFAULT_SECTION_LOUDNESS: f64 = -20.0;
const DEFAULT_SECTION_TEMPO: f64 = 120.0;
/// Sections louder than this (dB) are treated as choruses
const CHORUS_LOUDNESS_DB: f64 = -10.0;
const TIMELINE_WIDTH: usize = 80;

/// Time interval from Spotify's audio analysis (beats, bars, tatums)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeInterval {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub confidence: f64,
}

/// One entry of Spotify's `sections` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub loudness: Option<f64>,
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Subset of Spotify's `audio-analysis` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyAnalysis {
    #[serde(default)]
    pub sections: Vec<AnalysisSection>,
    #[serde(default)]
    pub beats: Vec<TimeInterval>,
}

/// Song description accepted by the analysis endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub spotify_id: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<f64>,
    #[serde(default)]
    pub audio_features: AudioFeatures,
    #[serde(default, deserialize_with = "non_empty_analysis")]
    pub spotify_analysis: Option<SpotifyAnalysis>,
}

/// `{}` counts as no analysis; `{"sections": []}` is an analysis without sections
fn non_empty_analysis<'de, D>(deserializer: D) -> Result<Option<SpotifyAnalysis>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

impl SongData {
    /// "<name> by <artist>", when both are known
    pub fn display_name(&self) -> Option<String> {
        match (self.name.as_deref(), self.artist.as_deref()) {
            (Some(name), Some(artist)) => Some(format!("{} by {}", name, artist)),
            (Some(name), None) => Some(name.to_string()),
            _ => None,
        }
    }

    /// Track duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms
            .or(self.audio_features.duration_ms)
            .unwrap_or(DEFAULT_DURATION_MS)
            / 1000.0
    }
}

/// Labeled time span of a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongSection {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    #[serde(alias = "start")]
    pub start_time: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loudness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
}

impl SongSection {
    fn span(kind: SectionKind, start_time: f64, duration: f64) -> Self {
        Self {
            kind,
            start_time,
            duration,
            loudness: None,
            tempo: None,
            energy: None,
            danceability: None,
        }
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time < self.end_time()
    }
}

/// Label section `index` of `total` from its loudness.
///
/// Rules apply in order: first is intro, last is outro, anything louder
/// than -10 dB is a chorus, the later part of the song (past 60%) is a
/// bridge, and the rest are verses.
pub fn classify_section(index: usize, total: usize, loudness: f64) -> SectionKind {
    let last = total.saturating_sub(1);

    if index == 0 {
        SectionKind::Intro
    } else if index == last {
        SectionKind::Outro
    } else if loudness > CHORUS_LOUDNESS_DB {
        SectionKind::Chorus
    } else if index as f64 > total as f64 * 0.6 && index < last {
        SectionKind::Bridge
    } else {
        SectionKind::Verse
    }
}

/// Analyze the structure of a song.
pub fn analyze(song: &SongData) -> Vec<SongSection> {
    match &song.spotify_analysis {
        Some(analysis) if !analysis.sections.is_empty() => from_analysis(&analysis.sections),
        Some(_) => {
            tracing::info!("Audio analysis has no sections, using default structure");
            default_structure()
        }
        None => estimate_structure(&song.audio_features, song.duration_secs()),
    }
}

/// Classify Spotify analysis sections
pub fn from_analysis(sections: &[AnalysisSection]) -> Vec<SongSection> {
    let total = sections.len();
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let loudness = section.loudness.unwrap_or(DEFAULT_SECTION_LOUDNESS);
            SongSection {
                loudness: Some(loudness),
                tempo: Some(section.tempo.unwrap_or(DEFAULT_SECTION_TEMPO)),
                ..SongSection::span(
                    classify_section(index, total, loudness),
                    section.start.unwrap_or(0.0),
                    section.duration.unwrap_or(0.0),
                )
            }
        })
        .collect()
}

/// Pop-song layout used when an analysis exists but carries no sections
pub fn default_structure() -> Vec<SongSection> {
    [
        (SectionKind::Verse, 0.0, 30.0),
        (SectionKind::Chorus, 30.0, 20.0),
        (SectionKind::Verse, 50.0, 30.0),
        (SectionKind::Chorus, 80.0, 20.0),
        (SectionKind::Bridge, 100.0, 20.0),
        (SectionKind::Chorus, 120.0, 30.0),
    ]
    .into_iter()
    .map(|(kind, start, duration)| SongSection::span(kind, start, duration))
    .collect()
}

/// Start and length of each estimated section as a share of the song
const ESTIMATED_LAYOUT: [(SectionKind, f64, f64); 8] = [
    (SectionKind::Intro, 0.00, 0.05),
    (SectionKind::Verse, 0.05, 0.15),
    (SectionKind::Chorus, 0.20, 0.10),
    (SectionKind::Verse, 0.30, 0.15),
    (SectionKind::Chorus, 0.45, 0.10),
    (SectionKind::Bridge, 0.60, 0.15),
    (SectionKind::Chorus, 0.75, 0.15),
    (SectionKind::Outro, 0.90, 0.10),
];

/// Estimate structure from duration alone
pub fn estimate_structure(features: &AudioFeatures, duration_secs: f64) -> Vec<SongSection> {
    let energy = features.energy_or_default();
    let danceability = features.danceability_or_default();

    ESTIMATED_LAYOUT
        .iter()
        .map(|&(kind, start_pct, len_pct)| SongSection {
            energy: Some(energy),
            danceability: Some(danceability),
            ..SongSection::span(kind, duration_secs * start_pct, duration_secs * len_pct)
        })
        .collect()
}

/// Section playing at `time` seconds.
///
/// Past the end of the song the last section keeps playing; an empty
/// structure is treated as one long verse.
pub fn section_at_time(structure: &[SongSection], time: f64) -> SectionKind {
    structure
        .iter()
        .find(|s| s.contains(time))
        .or_else(|| structure.last())
        .map(|s| s.kind)
        .unwrap_or(SectionKind::Verse)
}

/// Render an 80-column ASCII timeline of the structure
pub fn visualize(structure: &[SongSection], duration: f64) -> String {
    let mut timeline = vec![' '; TIMELINE_WIDTH];

    for section in structure {
        let start = column(section.start_time, duration);
        let end = column(section.end_time(), duration).min(TIMELINE_WIDTH);
        if start < end {
            timeline[start..end].fill(section.kind.symbol());
        }
    }

    let rule = "=".repeat(TIMELINE_WIDTH);
    [
        "Song Structure:".to_string(),
        rule.clone(),
        timeline.into_iter().collect(),
        rule,
        "Legend: I=Intro V=Verse C=Chorus B=Bridge O=Outro".to_string(),
        format!("Duration: {:.1}s", duration),
    ]
    .join("\n")
}

fn column(time: f64, duration: f64) -> usize {
    // Saturating float cast: NaN and negatives land on column 0
    ((time / duration) * TIMELINE_WIDTH as f64) as usize
}
