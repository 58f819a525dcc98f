//! portalfx - particle-ringed panorama portal
//!
//! Headless driver: steps a portal at a fixed frame delta and records what
//! the renderer would have been handed each frame.

mod config;
mod headless;

use anyhow::Result;
use clap::Parser;
use headless::HeadlessConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the particle portal", long_about = None)]
struct Args {
    /// Portal settings (TOML); missing or unparsable files fall back to defaults
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Number of frames to integrate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    delta: f32,

    /// Override the RNG seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// Override the panorama path from the config
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Write one JSON line per frame here
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write a metrics report here
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// Dump the effective settings as TOML to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting portalfx v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut portal = config::load_from_path(&args.config);
    if args.seed.is_some() {
        portal.seed = args.seed;
    }
    if args.texture.is_some() {
        portal.texture = args.texture;
    }
    if let Some(path) = &args.write_config {
        config::save_to_path(&portal, path)?;
        info!(path = %path.display(), "settings written");
        return Ok(());
    }

    let summary = headless::run(HeadlessConfig {
        portal,
        frames: args.frames,
        delta: args.delta,
        events: args.events,
        metrics: args.metrics,
    })?;

    println!(
        "{} frames, {} live particles, portal {}",
        summary.simulation.frames,
        summary.simulation.final_live_count,
        match summary.simulation.opened_at_frame {
            Some(tick) => format!("opened at frame {tick}"),
            None => "still closed".to_string(),
        }
    );
    Ok(())
}
