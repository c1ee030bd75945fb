//! Init command - set up a study project directory

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::StudyConfig;

/// Run the init command
pub fn run(path: &Path, force: bool) -> Result<()> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let config_path = StudyConfig::init(&root, force)?;
    println!(
        "{} Wrote {}",
        style("✓").green(),
        style(config_path.display()).cyan()
    );

    let lexicon_dir = root.join(&StudyConfig::default().paths.lexicon_dir);
    std::fs::create_dir_all(&lexicon_dir)
        .with_context(|| format!("Failed to create {}", lexicon_dir.display()))?;
    println!(
        "{} Created {}",
        style("✓").green(),
        style(lexicon_dir.display()).cyan()
    );

    println!("\nNext steps:");
    println!(
        "  Place the six cohort lexicons under {} (three_child.json, three_adult.json, ...)",
        style(lexicon_dir.display()).cyan()
    );
    println!(
        "  {} Derive the variable tables",
        style("phonpact derive").cyan()
    );
    println!(
        "  {} Write the study reports",
        style("phonpact descriptive && phonpact inferential").cyan()
    );

    Ok(())
}
