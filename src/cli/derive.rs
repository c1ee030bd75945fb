//! Derive command - build the per-cohort variable tables

use anyhow::Result;
use console::style;
use std::path::Path;

use crate::config::StudyConfig;
use crate::pipeline::Pipeline;

/// Run the derive command
pub fn run(path: &Path) -> Result<()> {
    let config = StudyConfig::load(path)?;
    let pipeline = Pipeline::new(path, config);
    let summary = pipeline.derive_all()?;

    for (cohort, rows) in &summary.derived {
        println!("{} {} ({} words)", style("✓").green(), cohort, rows);
    }
    for (cohort, reason) in &summary.failed {
        println!("{} {}: {}", style("✗").red(), cohort, reason);
    }
    println!("\n{}", summary.summary());

    if !summary.is_complete() {
        anyhow::bail!("{} cohort(s) failed to derive", summary.failed.len());
    }
    Ok(())
}
