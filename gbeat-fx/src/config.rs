//! Configuration resolution for gbeat-fx
//!
//! **Priority:** CLI → ENV → TOML → compiled default

use clap::Parser;
use gbeat_common::config::{resolve, resolve_key, LoggingConfig};
use gbeat_common::llm::ChatClient;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::generator::FixGenerator;

pub const DEFAULT_PORT: u16 = 7070;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-coder";
const MODEL_TIMEOUT: Duration = Duration::from_secs(60);

/// Command-line arguments for gbeat-fx
#[derive(Parser, Debug, Default)]
#[command(name = "gbeat-fx")]
#[command(about = "Satirical code fix generator")]
#[command(version)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(short, long, env = "GBEAT_FX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// DeepSeek API key; without one only canned fixes are served
    #[arg(long, env = "DEEPSEEK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "DEEPSEEK_BASE_URL")]
    pub base_url: Option<String>,

    /// Model name
    #[arg(long, env = "DEEPSEEK_MODEL")]
    pub model: Option<String>,
}

/// gbeat-fx TOML file
#[derive(Debug, Default, Deserialize)]
pub struct FxToml {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fully resolved gbeat-fx configuration
#[derive(Debug, Clone)]
pub struct FxConfig {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub log_level: Option<String>,
}

impl FxConfig {
    pub fn resolve(cli: Cli, toml: FxToml) -> Self {
        Self {
            host: resolve(cli.host, toml.host, DEFAULT_HOST.to_string()),
            port: resolve(cli.port, toml.port, DEFAULT_PORT),
            api_key: resolve_key(cli.api_key, toml.api_key),
            base_url: resolve(cli.base_url, toml.base_url, DEFAULT_BASE_URL.to_string()),
            model: resolve(cli.model, toml.model, DEFAULT_MODEL.to_string()),
            log_level: toml.logging.level,
        }
    }

    /// Build the fix generator; falls back to canned fixes without a key.
    pub fn fix_generator(&self) -> gbeat_common::Result<FixGenerator> {
        match &self.api_key {
            Some(key) => {
                let client = ChatClient::new(&self.base_url, key, &self.model, MODEL_TIMEOUT)?;
                info!("✓ Model client initialized ({} @ {})", self.model, self.base_url);
                Ok(FixGenerator::new(Some(client)))
            }
            None => {
                warn!("DEEPSEEK_API_KEY not set - using fallback fixes");
                Ok(FixGenerator::fallback_only())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FxConfig::resolve(Cli::default(), FxToml::default());
        assert_eq!(config.port, 7070);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.base_url, "https://api.deepseek.com");
        assert_eq!(config.model, "deepseek-coder");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_cli_beats_toml() {
        let cli = Cli {
            port: Some(7171),
            api_key: Some("cli-key".to_string()),
            ..Cli::default()
        };
        let toml = FxToml {
            port: Some(7272),
            model: Some("deepseek-chat".to_string()),
            api_key: Some("toml-key".to_string()),
            ..FxToml::default()
        };

        let config = FxConfig::resolve(cli, toml);
        assert_eq!(config.port, 7171);
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.api_key.as_deref(), Some("cli-key"));
    }

    #[test]
    fn test_blank_key_means_fallback_only() {
        let cli = Cli {
            api_key: Some("  ".to_string()),
            ..Cli::default()
        };
        let config = FxConfig::resolve(cli, FxToml::default());
        let generator = config.fix_generator().unwrap();
        assert!(!generator.model_available());
    }
}
