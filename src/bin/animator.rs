//! voxel-animator-server binary
//!
//! Starts the animator service over an in-memory grid world, loads every
//! persisted animation, and runs autorun playback until interrupted.
//!
//! ## Configuration (CLI / env, layered over optional TOML via `config`)
//!
//! | Key                          | Default      | Description                     |
//! |------------------------------|--------------|---------------------------------|
//! | `ANIMATOR_CONFIG`            | `animator`   | TOML settings file (optional)   |
//! | `ANIMATOR_STORAGE_DIR`       | `animations` | Animation record directory      |
//! | `ANIMATOR_GRIDS`             | `main`       | Comma-separated grid names      |
//! | `ANIMATOR_FRAME_INTERVAL_MS` | `500`        | Default frame interval          |
//! | `ANIMATOR_AUTORUN`           | `true`       | Start autorun animations        |
//! | `ANIMATOR_AUTORUN_DELAY`     | `5`          | Autorun grace period (seconds)  |

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use voxel_animator::{grid::MemoryGrid, service::AnimatorService, types::AnimatorConfig};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "voxel-animator-server", about = "Voxel Animator Engine", version)]
struct Args {
    /// TOML settings file (stem or path; missing file is not an error)
    #[arg(long, env = "ANIMATOR_CONFIG", default_value = "animator")]
    config: String,

    /// Animation record directory
    #[arg(long, env = "ANIMATOR_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Comma-separated grid names to expose
    #[arg(long, env = "ANIMATOR_GRIDS", value_delimiter = ',')]
    grids: Vec<String>,

    /// Default frame interval in milliseconds
    #[arg(long, env = "ANIMATOR_FRAME_INTERVAL_MS")]
    frame_interval_ms: Option<u64>,

    /// Start autorun animations after startup
    #[arg(long, env = "ANIMATOR_AUTORUN")]
    autorun: Option<bool>,

    /// Autorun grace period in seconds
    #[arg(long, env = "ANIMATOR_AUTORUN_DELAY")]
    autorun_delay_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// File settings
// ---------------------------------------------------------------------------

/// Shape of the optional TOML settings file. CLI/env values win over it.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    storage_dir: Option<PathBuf>,
    grids: Option<Vec<String>>,
    frame_interval_ms: Option<u64>,
    autorun: Option<bool>,
    autorun_delay_secs: Option<u64>,
    auto_save: Option<bool>,
}

fn load_settings(name: &str) -> Result<FileSettings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .build()
        .context("Failed to read settings file")?;

    settings
        .try_deserialize()
        .context("Failed to parse settings file")
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("voxel_animator=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let file = load_settings(&args.config)?;

    let defaults = AnimatorConfig::default();
    let config = AnimatorConfig {
        storage_dir: args
            .storage_dir
            .or(file.storage_dir)
            .unwrap_or(defaults.storage_dir),
        auto_save: file.auto_save.unwrap_or(defaults.auto_save),
        default_frame_interval_ms: args
            .frame_interval_ms
            .or(file.frame_interval_ms)
            .unwrap_or(defaults.default_frame_interval_ms),
        autorun_enabled: args
            .autorun
            .or(file.autorun)
            .unwrap_or(defaults.autorun_enabled),
        autorun_delay_secs: args
            .autorun_delay_secs
            .or(file.autorun_delay_secs)
            .unwrap_or(defaults.autorun_delay_secs),
    };

    let grids = if !args.grids.is_empty() {
        args.grids
    } else {
        file.grids.unwrap_or_else(|| vec!["main".to_string()])
    };

    info!(
        "Starting voxel-animator-server (storage='{}', grids={:?}, autorun={})",
        config.storage_dir.display(),
        grids,
        config.autorun_enabled,
    );

    // Build the grid world and the service
    let world = Arc::new(MemoryGrid::with_grids(grids));
    let service =
        AnimatorService::new(config, world).context("Failed to start animator service")?;

    let report = service.load_all().context("Failed to load animations")?;
    info!(
        "Load complete: {} loaded, {} skipped, {} upgraded",
        report.loaded, report.skipped, report.upgraded
    );

    service.start_autorun();

    // Run until shutdown
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down (SIGINT)");
    service.shutdown();

    Ok(())
}
