//! CLI command definitions and handlers

mod derive;
mod descriptive;
mod inferential;
mod init;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Phonpact - phonological adjusted-use studies over child speech lexicons
#[derive(Parser, Debug)]
#[command(name = "phonpact")]
#[command(
    version,
    about = "Derive phonological usage variables from child and adult lexicons and fit the study regressions",
    long_about = "Phonpact reads one lexicon per cohort (three ages, child and adult speakers), \
derives the per-word usage and neighborhood variables including the polynomial-adjusted \
use columns, and fits the study regressions with bootstrap confidence intervals.\n\n\
Run without a subcommand to execute the full study:\n  \
phonpact .",
    after_help = "\
Examples:
  phonpact init .                      Write a starter phonpact.toml
  phonpact derive                      Derive the six cohort variable tables
  phonpact descriptive                 Write the descriptive reports
  phonpact inferential                 Fit the study cells with bootstrap intervals
  phonpact inferential --seed 7        Same, with a different resampling seed
  phonpact .                           Full study: derive, then both report sets"
)]
pub struct Cli {
    /// Path to the study project (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a phonpact.toml config file with example settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Derive and persist the per-word variable table for every cohort
    #[command(after_help = "\
Reads one lexicon per cohort from the configured lexicon directory
(three_child.json, three_adult.json, and so on) and writes one derived
table per cohort to the derived directory.")]
    Derive,

    /// Summarize the derived variables per age group (descriptive reports)
    Descriptive,

    /// Fit every study cell with bootstrap confidence intervals (inferential reports)
    #[command(after_help = "\
Examples:
  phonpact inferential                       Use the configured seed and iterations
  phonpact inferential --seed 7              Re-run the study under a different seed
  phonpact inferential --iterations 10000    Tighter intervals, longer run")]
    Inferential {
        /// Override the configured bootstrap seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the configured bootstrap iteration count
        #[arg(long)]
        iterations: Option<usize>,
    },
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init { force }) => init::run(&cli.path, force),

        Some(Commands::Derive) => derive::run(&cli.path),

        Some(Commands::Descriptive) => descriptive::run(&cli.path),

        Some(Commands::Inferential { seed, iterations }) => {
            inferential::run(&cli.path, seed, iterations)
        }

        None => {
            // Default: the full study in order.
            derive::run(&cli.path)?;
            descriptive::run(&cli.path)?;
            inferential::run(&cli.path, None, None)
        }
    }
}
