//! Spotify Web API client
//!
//! Client-credentials flow only: track search, track lookup, audio features
//! and audio analysis. The access token is cached until shortly before it
//! expires.

use gbeat_common::config::join_url;
use gbeat_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::beats::AudioFeatures;
use crate::structure::SpotifyAnalysis;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);
/// Refresh this long before Spotify says the token expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Client credentials plus endpoint overrides
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub accounts_url: String,
}

impl SpotifySettings {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_url: DEFAULT_API_URL.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackArtist {
    pub name: String,
}

/// Spotify track object (subset)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

impl Track {
    /// First credited artist, or "Unknown"
    pub fn artist_name(&self) -> &str {
        self.artists
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: SearchTracks,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    #[serde(default)]
    items: Vec<Track>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Track id from a `spotify:track:<id>` URI (a bare id passes through)
pub fn track_id_from_uri(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}

/// Spotify Web API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    settings: SpotifySettings,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(settings: SpotifySettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            settings,
            token: Mutex::new(None),
        })
    }

    /// Bearer token, fetching a new one when the cached token is stale
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        let url = join_url(&self.settings.accounts_url, "api/token");
        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Spotify token response: {}", e)))?;
        tracing::debug!(expires_in = token.expires_in, "Obtained Spotify access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn get(&self, path: &str, timeout: Duration) -> Result<reqwest::Response> {
        let token = self.access_token().await?;
        let url = join_url(&self.settings.api_url, path);

        Ok(self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .timeout(timeout)
            .send()
            .await?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path, REQUEST_TIMEOUT).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Spotify {}: {}", path, e)))
    }

    /// First search hit for `track:<name> artist:<artist>`
    pub async fn search_track(&self, name: &str, artist: Option<&str>) -> Result<Option<Track>> {
        let query = match artist {
            Some(artist) => format!("track:{} artist:{}", name, artist),
            None => format!("track:{}", name),
        };

        let token = self.access_token().await?;
        let url = join_url(&self.settings.api_url, "v1/search");
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("type", "track"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Spotify search: {}", e)))?;
        Ok(results.tracks.items.into_iter().next())
    }

    /// Look up a track by id or `spotify:track:` URI
    pub async fn track(&self, id_or_uri: &str) -> Result<Track> {
        let id = track_id_from_uri(id_or_uri);
        self.get_json(&format!("v1/tracks/{}", id)).await
    }

    pub async fn audio_features(&self, track_id: &str) -> Result<AudioFeatures> {
        self.get_json(&format!("v1/audio-features/{}", track_id))
            .await
    }

    /// Full audio analysis; `None` when Spotify withholds it (403/404)
    pub async fn audio_analysis(&self, track_id: &str) -> Result<Option<SpotifyAnalysis>> {
        let path = format!("v1/audio-analysis/{}", track_id);
        let response = self.get(&path, ANALYSIS_TIMEOUT).await?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(
                track_id = track_id,
                status = status.as_u16(),
                "Audio analysis not available for this track"
            );
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let analysis = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("Spotify audio analysis: {}", e)))?;
        Ok(Some(analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_id_from_uri() {
        assert_eq!(
            track_id_from_uri("spotify:track:4uLU6hMCjMI75M1A2tKUQC"),
            "4uLU6hMCjMI75M1A2tKUQC"
        );
        assert_eq!(track_id_from_uri("4uLU6hMCjMI75M1A2tKUQC"), "4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn test_track_artist_name() {
        let track: Track = serde_json::from_str(
            r#"{"id": "abc", "name": "Around the World", "duration_ms": 429000,
                "artists": [{"name": "Daft Punk"}, {"name": "Somebody Else"}]}"#,
        )
        .unwrap();
        assert_eq!(track.artist_name(), "Daft Punk");

        let anonymous: Track = serde_json::from_str(r#"{"id": "x", "name": "Untitled"}"#).unwrap();
        assert_eq!(anonymous.artist_name(), "Unknown");
    }
}
