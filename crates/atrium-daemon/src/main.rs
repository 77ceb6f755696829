//! Atrium Daemon - Main entry point
//!
//! Serves the viewer bundle and 3D assets, runs the telemetry feed, and
//! fans out room-status and telemetry events to connected viewers.

mod api;
mod config;
mod feed;
mod server;
mod state;
mod ws;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "atrium")]
#[command(about = "Building monitoring daemon and telemetry feed")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "atrium.toml")]
    config: PathBuf,

    /// Bind address for web server
    #[arg(short, long)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Atrium v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = config::load_config(&args.config)?;

    // Override bind address if specified
    if let Some(bind) = args.bind {
        config.daemon.bind = bind;
    }

    info!(
        simulate = config.feed.simulate,
        scripted_rooms = config.room_script.len(),
        "Configuration loaded"
    );

    // Create application state and serve
    let bind = config.daemon.bind.clone();
    let state = state::AppState::new(config);
    server::run(state, &bind).await?;

    Ok(())
}
