//! Study configuration loaded from `phonpact.toml`.
//!
//! Everything has a sensible default, so a project with six lexicon files
//! in `lexicons/` runs with no config file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::CohortId;
use crate::regress::BootstrapOptions;

pub const CONFIG_FILENAME: &str = "phonpact.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Prepared lexicon files, one per cohort (`three_child.json`, ...).
    pub lexicon_dir: PathBuf,
    /// Derived-table JSON artifacts.
    pub derived_dir: PathBuf,
    /// Rendered report files.
    pub results_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lexicon_dir: PathBuf::from("lexicons"),
            derived_dir: PathBuf::from("derived"),
            results_dir: PathBuf::from("results"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Resample draws per regression cell.
    pub iterations: usize,
    /// Central interval mass, e.g. 0.95 for 95% intervals.
    pub alpha: f64,
    /// Base seed; each study cell derives its own seed from it.
    pub seed: u64,
    /// Abort a cell once singular draws exceed this share of the draws.
    pub max_singular_ratio: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            alpha: 0.95,
            seed: 0,
            max_singular_ratio: 0.5,
        }
    }
}

impl StudyConfig {
    /// Load from `<root>/phonpact.toml`, falling back to defaults when the
    /// file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILENAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Write a commented starter config. Refuses to overwrite an existing
    /// file unless `force`.
    pub fn init(root: &Path, force: bool) -> Result<PathBuf> {
        let path = root.join(CONFIG_FILENAME);
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists (pass --force to overwrite)",
                path.display()
            );
        }
        std::fs::create_dir_all(root).with_context(|| format!("creating {}", root.display()))?;
        std::fs::write(&path, EXAMPLE_CONFIG)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn lexicon_path(&self, root: &Path, cohort: CohortId) -> PathBuf {
        root.join(&self.paths.lexicon_dir)
            .join(format!("{}.json", cohort.stem()))
    }

    pub fn derived_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.derived_dir)
    }

    pub fn results_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.paths.results_dir)
    }

    pub fn bootstrap_options(&self) -> BootstrapOptions {
        BootstrapOptions {
            iterations: self.bootstrap.iterations,
            alpha: self.bootstrap.alpha,
            seed: self.bootstrap.seed,
            max_singular_ratio: self.bootstrap.max_singular_ratio,
        }
    }
}

const EXAMPLE_CONFIG: &str = r#"# Phonpact study configuration

[paths]
# Prepared lexicon files, one per cohort:
# three_child.json, three_adult.json, four_child.json, ...
# lexicon_dir = "lexicons"

# Derived variable tables (JSON artifacts)
# derived_dir = "derived"

# Rendered report files
# results_dir = "results"

[bootstrap]
# Resample draws per regression cell
# iterations = 1000

# Central interval mass
# alpha = 0.95

# Base seed; each cell offsets from it, so runs are reproducible
# seed = 0

# Abort a cell when singular draws exceed this share of the draws
# max_singular_ratio = 0.5
"#;
