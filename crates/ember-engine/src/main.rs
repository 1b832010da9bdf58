//! # Ember
//!
//! Headless runner for particle emitter scenes.
//!
//! Usage: `ember [config.toml]`. Without an argument the configuration is
//! read from `ember.toml` in the working directory, falling back to
//! defaults when the file is missing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod scene;
mod timing;

use anyhow::Result;
use config::EngineConfig;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("ember=info".parse()?))
        .init();

    info!("Ember starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    };

    let summary = app::run(config)?;
    info!(
        frames = summary.frames,
        alive = summary.stats.alive,
        peak = summary.peak_alive,
        "Ember shutdown complete"
    );
    Ok(())
}
