//! gbeat-fx (Satirical Fix Generator) - Main entry point
//!
//! Generates absurd "fixes" for errors produced by the error generator,
//! referencing the slogan the slogan server invented for them.

use anyhow::{Context, Result};
use clap::Parser;
use gbeat_common::config::load_toml_config;
use gbeat_common::logging::init_tracing;
use tracing::info;

use gbeat_fx::config::{Cli, FxConfig, FxToml};
use gbeat_fx::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml: FxToml = load_toml_config(cli.config.as_deref()).context("Failed to load config file")?;
    let config = FxConfig::resolve(cli, toml);

    init_tracing(config.log_level.as_deref(), "gbeat_fx=info,tower_http=info");

    info!(
        "Starting GlitchBeat Fix Generator (gbeat-fx) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let generator = config
        .fix_generator()
        .context("Failed to initialize model client")?;

    let app = build_router(AppState::new(generator));

    gbeat_common::server::serve(app, &config.host, config.port)
        .await
        .context("Server error")?;

    Ok(())
}
