//! gbeat-rc (Rhythm Controller) - Main entry point
//!
//! Serves song analysis and beat trigger endpoints, forwarding triggers to
//! the error generator.

use anyhow::{Context, Result};
use clap::Parser;
use gbeat_common::config::load_toml_config;
use gbeat_common::logging::init_tracing;
use tracing::info;

use gbeat_rc::config::{Cli, RcConfig, RcToml};
use gbeat_rc::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let toml: RcToml = load_toml_config(cli.config.as_deref()).context("Failed to load config file")?;
    let config = RcConfig::resolve(cli, toml);

    init_tracing(config.log_level.as_deref(), "gbeat_rc=info,tower_http=info");

    info!(
        "Starting GlitchBeat Rhythm Controller (gbeat-rc) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "FPGA mode: {}",
        if config.use_fpga {
            "ENABLED"
        } else {
            "DISABLED (CPU simulation)"
        }
    );
    info!("Error generator URL: {}", config.error_generator_url);

    let controller = config
        .rhythm_controller()
        .context("Failed to initialize rhythm controller")?;

    let app = build_router(AppState::new(controller));

    gbeat_common::server::serve(app, &config.host, config.port)
        .await
        .context("Server error")?;

    Ok(())
}
