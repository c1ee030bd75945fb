//! Inferential command - fit the study cells with bootstrap intervals

use anyhow::Result;
use console::style;
use std::path::Path;

use crate::config::StudyConfig;
use crate::pipeline::Pipeline;

/// Run the inferential command
pub fn run(path: &Path, seed: Option<u64>, iterations: Option<usize>) -> Result<()> {
    let mut config = StudyConfig::load(path)?;
    if let Some(seed) = seed {
        config.bootstrap.seed = seed;
    }
    if let Some(iterations) = iterations {
        config.bootstrap.iterations = iterations;
    }

    let pipeline = Pipeline::new(path, config);
    let written = pipeline.inferential()?;

    for report in &written {
        println!("{} {}", style("✓").green(), report.display());
    }
    Ok(())
}
