//! gbeat-sl (Slogan Server) - Main entry point
//!
//! Answers `POST /error-log` with a sardonic slogan for the logged error.

use anyhow::{Context, Result};
use clap::Parser;
use gbeat_common::config::load_toml_config;
use gbeat_common::logging::init_tracing;
use tracing::info;

use gbeat_sl::config::{Cli, SlConfig, SlToml};
use gbeat_sl::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml: SlToml = load_toml_config(cli.config.as_deref()).context("Failed to load config file")?;
    let config = SlConfig::resolve(cli, toml);

    init_tracing(config.log_level.as_deref(), "gbeat_sl=info,tower_http=info");

    info!(
        "Starting GlitchBeat Slogan Server (gbeat-sl) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let generator = config
        .slogan_generator()
        .context("Failed to initialize model client")?;

    let app = build_router(AppState::new(generator));

    gbeat_common::server::serve(app, &config.host, config.port)
        .await
        .context("Server error")?;

    Ok(())
}
