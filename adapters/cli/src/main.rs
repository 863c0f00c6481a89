#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays moving-effect scenarios frame by frame.

mod replay;
mod scenario;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;

use crate::scenario::Scenario;

/// Replays a moving-effect scenario and prints every effect frame by frame.
#[derive(Debug, Parser)]
#[command(name = "moving-effects", version)]
struct Args {
    /// Scenario file in TOML. A built-in homing bolt is replayed when omitted.
    scenario: Option<PathBuf>,
    /// Overrides the frame limit of the scenario.
    #[arg(long)]
    frames: Option<u32>,
    /// Suppresses the per-frame report.
    #[arg(long)]
    quiet: bool,
}

/// Entry point for the moving-effects command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin(),
    };
    let max_frames = args.frames.unwrap_or(scenario.max_frames);

    let summary = replay::run(&scenario, max_frames, args.quiet, &mut io::stdout().lock())?;
    println!(
        "{} frames, {} impacts, {} effects in flight",
        summary.frames, summary.impacts, summary.remaining
    );
    Ok(())
}
