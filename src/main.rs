//! Phonpact - phonological adjusted-use study CLI
//!
//! Derives per-word usage and neighborhood variables from child and adult
//! speech lexicons and fits the study regressions with bootstrap intervals.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use phonpact::cli;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Parse CLI args and run
    let cli = cli::Cli::parse();
    cli::run(cli)
}
