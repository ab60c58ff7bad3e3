//! clipbatch CLI: watch a directory and upload new video clips in batches.

use anyhow::Result;
use clap::Parser;
use clipbatch::engine::{Cli, handle_run};
use std::time::Instant;

fn main() -> Result<()> {
    let started = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::info!("Monitor ran for {:?}", started.elapsed());
    Ok(())
}
