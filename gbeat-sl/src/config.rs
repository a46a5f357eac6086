//! Configuration resolution for gbeat-sl
//!
//! **Priority:** CLI → ENV → TOML → compiled default

use clap::Parser;
use gbeat_common::config::{resolve, resolve_key, LoggingConfig};
use gbeat_common::llm::ChatClient;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::slogans::{SloganGenerator, FALLBACK_SLOGANS};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MODEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Command-line arguments for gbeat-sl
#[derive(Parser, Debug, Default)]
#[command(name = "gbeat-sl")]
#[command(about = "Sardonic slogan server")]
#[command(version)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(short, long, env = "GBEAT_SL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "BIND_HOST")]
    pub host: Option<String>,

    /// OpenAI API key; without one slogans come from the built-in list
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,

    /// Model name
    #[arg(long, env = "OPENAI_MODEL")]
    pub model: Option<String>,
}

/// gbeat-sl TOML file
#[derive(Debug, Default, Deserialize)]
pub struct SlToml {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Fully resolved gbeat-sl configuration
#[derive(Debug, Clone)]
pub struct SlConfig {
    pub host: String,
    pub port: u16,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub log_level: Option<String>,
}

impl SlConfig {
    pub fn resolve(cli: Cli, toml: SlToml) -> Self {
        Self {
            host: resolve(cli.host, toml.host, DEFAULT_HOST.to_string()),
            port: resolve(cli.port, toml.port, DEFAULT_PORT),
            api_key: resolve_key(cli.api_key, toml.api_key),
            base_url: resolve(cli.base_url, toml.base_url, DEFAULT_BASE_URL.to_string()),
            model: resolve(cli.model, toml.model, DEFAULT_MODEL.to_string()),
            log_level: toml.logging.level,
        }
    }

    pub fn slogan_generator(&self) -> gbeat_common::Result<SloganGenerator> {
        let generator = match &self.api_key {
            Some(key) => {
                info!("OpenAI API key configured, will generate slogans dynamically");
                let client = ChatClient::new(&self.base_url, key, &self.model, MODEL_TIMEOUT)?;
                SloganGenerator::new(Some(client))
            }
            None => {
                info!("OpenAI API key not set, using fallback slogans only");
                SloganGenerator::fallback_only()
            }
        };
        info!("Loaded {} fallback slogans", FALLBACK_SLOGANS.len());
        Ok(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SlConfig::resolve(Cli::default(), SlToml::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert!(!config.slogan_generator().unwrap().model_available());
    }

    #[test]
    fn test_toml_key_enables_model() {
        let toml = SlToml {
            api_key: Some("sk-test".to_string()),
            ..SlToml::default()
        };
        let config = SlConfig::resolve(Cli::default(), toml);
        assert!(config.slogan_generator().unwrap().model_available());
    }
}
