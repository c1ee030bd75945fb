//! Descriptive command - summarize the derived variables

use anyhow::Result;
use console::style;
use std::path::Path;

use crate::config::StudyConfig;
use crate::pipeline::Pipeline;

/// Run the descriptive command
pub fn run(path: &Path) -> Result<()> {
    let config = StudyConfig::load(path)?;
    let pipeline = Pipeline::new(path, config);
    let written = pipeline.descriptive()?;

    for report in &written {
        println!("{} {}", style("✓").green(), report.display());
    }
    Ok(())
}
