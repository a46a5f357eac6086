//! Rhythm demo driver
//!
//! Walks a [`BeatPlan`] beat by beat and asks the error generator for an
//! error every few beats, plus one final trigger when the song ends.

use gbeat_common::TriggerPayload;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::plan::{BeatPlan, BEATS_PER_TRIGGER};
use crate::spotify::SpotifyClient;
use crate::structure::{self, SongData, SongSection};
use crate::trigger::ErrorGeneratorClient;

/// The demo waits longer for the error generator than the service does
pub const DEMO_TRIGGER_TIMEOUT: Duration = Duration::from_secs(5);

/// How the user picked a Spotify track
#[derive(Debug, Clone, PartialEq)]
pub enum TrackSelection {
    Uri(String),
    Search { track: String, artist: Option<String> },
}

/// Track the plan was built from
#[derive(Debug, Clone)]
pub struct TrackInfo {
    pub name: String,
    pub artist: String,
    pub duration_ms: u64,
    /// Labeled sections, as the rhythm service would analyze the track
    pub structure: Vec<SongSection>,
}

impl TrackInfo {
    /// ASCII timeline of the track's structure
    pub fn timeline(&self) -> String {
        structure::visualize(&self.structure, self.duration_ms as f64 / 1000.0)
    }
}

/// Build a plan from a real track.
///
/// Uses the full audio analysis when Spotify provides one, otherwise the
/// canonical layout at the track's tempo. `None` means the demo should
/// fall back to the simulated song.
pub async fn spotify_plan(
    spotify: &SpotifyClient,
    selection: &TrackSelection,
) -> Option<(BeatPlan, TrackInfo)> {
    let track = match selection {
        TrackSelection::Uri(uri) => spotify.track(uri).await.map(Some),
        TrackSelection::Search { track, artist } => {
            spotify.search_track(track, artist.as_deref()).await
        }
    };

    let track = match track {
        Ok(Some(track)) => track,
        Ok(None) => {
            warn!("No tracks found for {:?}", selection);
            return None;
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch track from Spotify");
            return None;
        }
    };

    let name = track.name.clone();
    let artist = track.artist_name().to_string();
    info!("✓ Found track: {} by {}", name, artist);

    let features = match spotify.audio_features(&track.id).await {
        Ok(features) => features,
        Err(e) => {
            warn!(error = %e, "Failed to get audio features");
            return None;
        }
    };
    info!(
        "✓ Retrieved audio features (tempo: {:.1} BPM)",
        features.tempo.unwrap_or(0.0)
    );

    let analysis = match spotify.audio_analysis(&track.id).await {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(error = %e, "Audio analysis unavailable, using tempo-based simulation");
            None
        }
    };

    let song = SongData {
        name: Some(name.clone()),
        artist: Some(artist.clone()),
        spotify_id: Some(track.id.clone()),
        duration_ms: Some(track.duration_ms as f64),
        audio_features: features.clone(),
        spotify_analysis: analysis.clone(),
    };
    let info = TrackInfo {
        name,
        artist,
        duration_ms: track.duration_ms,
        structure: structure::analyze(&song),
    };

    let plan = match analysis {
        Some(analysis) => {
            info!(
                "✓ Retrieved audio analysis ({} sections, {} beats)",
                analysis.sections.len(),
                analysis.beats.len()
            );
            BeatPlan::from_spotify(&analysis, &features)
        }
        None => {
            let tempo = features.tempo.unwrap_or(crate::beats::DEFAULT_TEMPO);
            info!(
                "✓ Using Spotify tempo with simulated structure: {:.1} BPM, energy {:.2}, danceability {:.2}",
                tempo,
                features.energy.unwrap_or(0.0),
                features.danceability.unwrap_or(0.0)
            );
            BeatPlan::tempo_only(tempo, info.duration_ms)
        }
    };

    match plan {
        Ok(plan) => Some((plan, info)),
        Err(e) => {
            warn!(error = %e, "Spotify data unusable");
            None
        }
    }
}

/// What a demo run did
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSummary {
    pub total_beats: u64,
    pub song_duration: f64,
    pub elapsed: Duration,
    pub triggers_sent: u64,
    pub expected_triggers: u64,
    pub interrupted: bool,
}

/// Sends a plan's triggers to the error generator
pub struct DemoDriver {
    error_generator: ErrorGeneratorClient,
    beats_per_trigger: u64,
    realtime: bool,
}

impl DemoDriver {
    pub fn new(error_generator: ErrorGeneratorClient) -> Self {
        Self {
            error_generator,
            beats_per_trigger: BEATS_PER_TRIGGER,
            realtime: false,
        }
    }

    /// Sleep one beat between beats instead of running flat out
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn beats_per_trigger(mut self, beats: u64) -> Self {
        self.beats_per_trigger = beats.max(1);
        self
    }

    async fn send(&self, plan: &BeatPlan, beat: u64, sent: &mut u64) {
        let Some(section) = plan.section_at_beat(beat) else {
            return;
        };
        let payload =
            TriggerPayload::new(section.error_type, beat, section.section.clone(), plan.tempo());

        if self.error_generator.trigger(&payload).await {
            *sent += 1;
            info!(
                "🎵 Beat {:3} | {:12} | {:14} | Trigger #{}",
                beat,
                section.section,
                section.error_type.as_str(),
                sent
            );
        }
    }

    /// Play the plan; cancelling `stop` ends the run early without the
    /// final trigger
    pub async fn run(&self, plan: &BeatPlan, stop: CancellationToken) -> DemoSummary {
        let total_beats = plan.total_beats();
        let beat_sleep = Duration::try_from_secs_f64(plan.beat_duration()).unwrap_or(Duration::ZERO);
        let started = Instant::now();
        let mut sent = 0u64;
        let mut interrupted = false;

        for beat in 0..total_beats {
            if stop.is_cancelled() {
                interrupted = true;
                break;
            }

            if beat > 0 && beat % self.beats_per_trigger == 0 {
                self.send(plan, beat, &mut sent).await;
            }

            if self.realtime {
                tokio::select! {
                    _ = stop.cancelled() => {
                        interrupted = true;
                        break;
                    }
                    _ = tokio::time::sleep(beat_sleep) => {}
                }
            }
        }

        if interrupted {
            warn!("⏸️  Demo interrupted by user");
        } else {
            // One last error as the song ends
            self.send(plan, total_beats, &mut sent).await;
        }

        DemoSummary {
            total_beats,
            song_duration: plan.total_duration(),
            elapsed: started.elapsed(),
            triggers_sent: sent,
            expected_triggers: plan.expected_triggers(self.beats_per_trigger),
            interrupted,
        }
    }
}

impl DemoSummary {
    /// Summary block printed after a run
    pub fn render(&self, tempo: f64, beats_per_trigger: u64) -> String {
        let rule = "=".repeat(70);
        [
            rule.clone(),
            "📊 DEMO SUMMARY".to_string(),
            rule.clone(),
            format!(
                "Song Duration:       {:.1}s ({} beats)",
                self.song_duration, self.total_beats
            ),
            format!("Execution Time:      {:.1}s", self.elapsed.as_secs_f64()),
            format!("Triggers Sent:       {}", self.triggers_sent),
            format!("Expected Triggers:   {}", self.expected_triggers),
            format!("Tempo:               {:.1} BPM", tempo),
            format!("Trigger Interval:    Every {} beats", beats_per_trigger),
            rule,
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_run_skips_final_trigger() {
        let client = ErrorGeneratorClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(100));
        let driver = DemoDriver::new(client);
        let plan = BeatPlan::canonical(120.0).unwrap();

        let stop = CancellationToken::new();
        stop.cancel();
        let summary = driver.run(&plan, stop).await;

        assert!(summary.interrupted);
        assert_eq!(summary.triggers_sent, 0);
        assert_eq!(summary.expected_triggers, 9);
        assert_eq!(summary.total_beats, 128);
    }

    #[test]
    fn test_summary_render() {
        let summary = DemoSummary {
            total_beats: 128,
            song_duration: 64.0,
            elapsed: Duration::from_millis(1500),
            triggers_sent: 9,
            expected_triggers: 9,
            interrupted: false,
        };
        let text = summary.render(120.0, 16);
        assert!(text.contains("Song Duration:       64.0s (128 beats)"));
        assert!(text.contains("Triggers Sent:       9"));
        assert!(text.contains("Every 16 beats"));
    }
}
