//! Termsift CLI: `termsift <FIELDS_FILE> <DIRECTORY> [DATABASE]`.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use termsift::engine::Cli;
use termsift::engine::handle_run;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
