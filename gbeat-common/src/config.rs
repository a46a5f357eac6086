//! Configuration loading
//!
//! Every service resolves each setting in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file (`--config <path>`)
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 are both handled by clap (`#[arg(env = ...)]`), so callers
//! pass the clap value as `cli_or_env` to [`resolve`].

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// `[logging]` table shared by all service TOML files
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "gbeat_rc=debug")
    #[serde(default)]
    pub level: Option<String>,
}

/// Load a TOML config file into `T`.
///
/// A missing path or missing file yields `T::default()` with a warning;
/// an unreadable or malformed file is a configuration error.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        return Ok(T::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using environment and defaults",
            path.display()
        );
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file {}", path.display());
    Ok(config)
}

/// Pick the highest-priority value that is present.
pub fn resolve<T>(cli_or_env: Option<T>, toml: Option<T>, default: T) -> T {
    cli_or_env.or(toml).unwrap_or(default)
}

/// Resolve an API key; blank or whitespace-only values count as unset.
pub fn resolve_key(cli_or_env: Option<String>, toml: Option<String>) -> Option<String> {
    let cli_or_env = cli_or_env.filter(|k| is_valid_key(k));
    let toml = toml.filter(|k| is_valid_key(k));

    if cli_or_env.is_some() && toml.is_some() {
        warn!("API key found in both environment and TOML config, using environment");
    }

    cli_or_env.or(toml)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Deserialize)]
    struct Sample {
        port: Option<u16>,
        #[serde(default)]
        logging: LoggingConfig,
    }

    #[test]
    fn test_resolve_priority() {
        assert_eq!(resolve(Some(1), Some(2), 3), 1);
        assert_eq!(resolve(None, Some(2), 3), 2);
        assert_eq!(resolve(None::<u16>, None, 3), 3);
    }

    #[test]
    fn test_resolve_key_ignores_blank() {
        assert_eq!(
            resolve_key(Some("   ".to_string()), Some("toml-key".to_string())),
            Some("toml-key".to_string())
        );
        assert_eq!(resolve_key(Some(String::new()), None), None);
        assert_eq!(
            resolve_key(Some("env-key".to_string()), Some("toml-key".to_string())),
            Some("env-key".to_string())
        );
    }

    #[test]
    fn test_missing_path_is_default() {
        let sample: Sample = load_toml_config(None).unwrap();
        assert!(sample.port.is_none());
        assert!(sample.logging.level.is_none());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:9090/", "/api/rhythm-trigger"),
            "http://localhost:9090/api/rhythm-trigger"
        );
        assert_eq!(
            join_url("https://api.deepseek.com", "chat/completions"),
            "https://api.deepseek.com/chat/completions"
        );
    }
}
