#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line driver that generates, solves and exports a maze.
//!
//! Settings are read from `maze-solver.toml` in the working directory when it
//! exists; log verbosity follows `RUST_LOG`.

mod driver;
mod settings;

use std::{io, path::Path};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::{Settings, DEFAULT_SETTINGS_PATH};

/// Entry point for the maze solver command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::load(Path::new(DEFAULT_SETTINGS_PATH))?;
    let report = driver::run(&settings, &mut io::stdout())?;
    info!(
        explorers = report.explorers(),
        waves = report.waves(),
        "solve finished"
    );
    Ok(())
}
