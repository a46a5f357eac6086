//! Configuration resolution for gbeat-rc
//!
//! **Priority:** CLI → ENV → TOML → compiled default

use clap::Parser;
use gbeat_common::config::{resolve, resolve_key, LoggingConfig};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::beats::DEFAULT_TEMPO;
use crate::controller::RhythmController;
use crate::spotify::{SpotifyClient, SpotifySettings, DEFAULT_ACCOUNTS_URL, DEFAULT_API_URL};
use crate::trigger::{ErrorGeneratorClient, DEFAULT_ERROR_GENERATOR_URL};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Command-line arguments for gbeat-rc
#[derive(Parser, Debug, Default)]
#[command(name = "gbeat-rc")]
#[command(about = "Rhythm controller: beat-synchronized error triggers")]
#[command(version)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(short, long, env = "GBEAT_RC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// Error generator base URL
    #[arg(long, env = "ERROR_GENERATOR_URL")]
    pub error_generator_url: Option<String>,

    /// Tempo (BPM) used until a song provides one
    #[arg(long, env = "DEFAULT_TEMPO")]
    pub default_tempo: Option<f64>,

    /// Report FPGA acceleration as enabled
    #[arg(long, env = "USE_FPGA", value_parser = clap::builder::BoolishValueParser::new())]
    pub use_fpga: Option<bool>,

    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub spotify_client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub spotify_client_secret: Option<String>,

    /// Spotify Web API base URL
    #[arg(long, env = "SPOTIFY_API_URL")]
    pub spotify_api_url: Option<String>,

    /// Spotify accounts service base URL
    #[arg(long, env = "SPOTIFY_ACCOUNTS_URL")]
    pub spotify_accounts_url: Option<String>,
}

/// `[spotify]` table
#[derive(Debug, Default, Deserialize)]
pub struct SpotifyToml {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: Option<String>,
    pub accounts_url: Option<String>,
}

/// gbeat-rc TOML file
#[derive(Debug, Default, Deserialize)]
pub struct RcToml {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub error_generator_url: Option<String>,
    pub default_tempo: Option<f64>,
    pub use_fpga: Option<bool>,
    #[serde(default)]
    pub spotify: SpotifyToml,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fully resolved gbeat-rc configuration
#[derive(Debug, Clone)]
pub struct RcConfig {
    pub host: String,
    pub port: u16,
    pub error_generator_url: String,
    pub default_tempo: f64,
    pub use_fpga: bool,
    /// Present only when both client id and secret are set
    pub spotify: Option<SpotifySettings>,
    pub log_level: Option<String>,
}

impl RcConfig {
    pub fn resolve(cli: Cli, toml: RcToml) -> Self {
        let client_id = resolve_key(cli.spotify_client_id, toml.spotify.client_id);
        let client_secret = resolve_key(cli.spotify_client_secret, toml.spotify.client_secret);

        let spotify = match (client_id, client_secret) {
            (Some(id), Some(secret)) => Some(SpotifySettings {
                client_id: id,
                client_secret: secret,
                api_url: resolve(
                    cli.spotify_api_url,
                    toml.spotify.api_url,
                    DEFAULT_API_URL.to_string(),
                ),
                accounts_url: resolve(
                    cli.spotify_accounts_url,
                    toml.spotify.accounts_url,
                    DEFAULT_ACCOUNTS_URL.to_string(),
                ),
            }),
            _ => None,
        };

        Self {
            host: resolve(cli.host, toml.host, DEFAULT_HOST.to_string()),
            port: resolve(cli.port, toml.port, DEFAULT_PORT),
            error_generator_url: resolve(
                cli.error_generator_url,
                toml.error_generator_url,
                DEFAULT_ERROR_GENERATOR_URL.to_string(),
            ),
            default_tempo: resolve(cli.default_tempo, toml.default_tempo, DEFAULT_TEMPO),
            use_fpga: resolve(cli.use_fpga, toml.use_fpga, false),
            spotify,
            log_level: toml.logging.level,
        }
    }

    /// Build the controller; Spotify lookups are skipped without credentials
    pub fn rhythm_controller(&self) -> gbeat_common::Result<RhythmController> {
        // Rejects a non-positive default tempo up front
        crate::beats::beat_interval(self.default_tempo)?;

        let error_generator = ErrorGeneratorClient::new(&self.error_generator_url);
        let controller =
            RhythmController::new(error_generator, self.default_tempo).with_fpga(self.use_fpga);

        match &self.spotify {
            Some(settings) => {
                let client = SpotifyClient::new(settings.clone())?;
                info!("✓ Spotify client initialized ({})", settings.api_url);
                Ok(controller.with_spotify(client))
            }
            None => {
                warn!("⚠️  Spotify credentials not set. Some features may be limited.");
                Ok(controller)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RcConfig::resolve(Cli::default(), RcToml::default());
        assert_eq!(config.port, 5000);
        assert_eq!(config.error_generator_url, "http://localhost:9090");
        assert_eq!(config.default_tempo, 120.0);
        assert!(!config.use_fpga);
        assert!(config.spotify.is_none());
    }

    #[test]
    fn test_spotify_needs_both_credentials() {
        let cli = Cli {
            spotify_client_id: Some("id".to_string()),
            ..Cli::default()
        };
        let config = RcConfig::resolve(cli, RcToml::default());
        assert!(config.spotify.is_none());

        let cli = Cli {
            spotify_client_id: Some("id".to_string()),
            ..Cli::default()
        };
        let toml = RcToml {
            spotify: SpotifyToml {
                client_secret: Some("secret".to_string()),
                api_url: Some("http://127.0.0.1:4000".to_string()),
                ..SpotifyToml::default()
            },
            ..RcToml::default()
        };
        let spotify = RcConfig::resolve(cli, toml).spotify.unwrap();
        assert_eq!(spotify.client_secret, "secret");
        assert_eq!(spotify.api_url, "http://127.0.0.1:4000");
        assert_eq!(spotify.accounts_url, "https://accounts.spotify.com");
    }

    #[test]
    fn test_cli_beats_toml() {
        let cli = Cli {
            use_fpga: Some(true),
            default_tempo: Some(128.0),
            ..Cli::default()
        };
        let toml = RcToml {
            use_fpga: Some(false),
            default_tempo: Some(90.0),
            port: Some(5050),
            ..RcToml::default()
        };

        let config = RcConfig::resolve(cli, toml);
        assert!(config.use_fpga);
        assert_eq!(config.default_tempo, 128.0);
        assert_eq!(config.port, 5050);
    }

    #[test]
    fn test_bad_default_tempo_rejected() {
        let cli = Cli {
            default_tempo: Some(0.0),
            ..Cli::default()
        };
        let config = RcConfig::resolve(cli, RcToml::default());
        assert!(config.rhythm_controller().is_err());
    }

    #[test]
    fn test_controller_reports_fpga_flag() {
        let cli = Cli {
            use_fpga: Some(true),
            ..Cli::default()
        };
        let controller = RcConfig::resolve(cli, RcToml::default())
            .rhythm_controller()
            .unwrap();
        assert!(controller.fpga_enabled());
    }
}
