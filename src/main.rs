//! Replays a recorded overlay scene and reports what was drawn.
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use ship_overlay::{init_logging, replay, IconSet, NameTable, OverlayConfig, Scene};

/// Ship overlay scene replayer
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded scene to replay
    #[arg(short, long)]
    scene: PathBuf,
    /// Overlay configuration; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Ship name table; the built-in table applies when omitted
    #[arg(short, long)]
    names: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => OverlayConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => OverlayConfig::default(),
    };
    let names = match &args.names {
        Some(path) => NameTable::load(path)
            .with_context(|| format!("loading name table {}", path.display()))?,
        None => NameTable::builtin(),
    };
    let scene = Scene::load(&args.scene)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;

    let report = replay(&scene, &config, &names, IconSet::default());
    let drawn: usize = report.frames.iter().map(|f| f.visible).sum();
    info!(
        "replayed {} frames: {drawn} ship draws, {} ships tracked at end",
        report.frames.len(),
        report.ships_remaining
    );
    if report.primitives_leaked > 0 {
        bail!("{} primitives leaked", report.primitives_leaked);
    }
    Ok(())
}
