//! Study pipeline
//!
//! Orchestrates the full study:
//! 1. Load the child and adult lexicons for every cohort
//! 2. Derive the per-word variable tables and persist them as artifacts
//! 3. Summarize the derived variables (descriptive reports)
//! 4. Fit the study regressions with bootstrap intervals (inferential reports)

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::StudyConfig;
use crate::derive::{self, KlatteseShapes, KlatteseSimilarity};
use crate::models::{AgeGroup, CohortId, Column, DerivedRow, DerivedTable, RowFilter, SpeakerRole};
use crate::regress::{self, BootstrapOptions};
use crate::reporters::{text, DescriptiveBlock, InferentialRow};
use crate::stats::Describe;
use crate::store::{self, ArtifactStore};

/// Full study pipeline rooted at a project directory.
pub struct Pipeline {
    root: PathBuf,
    config: StudyConfig,
}

impl Pipeline {
    /// Create a pipeline for the project at `root`.
    pub fn new(root: impl Into<PathBuf>, config: StudyConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    fn store(&self) -> ArtifactStore {
        ArtifactStore::new(self.config.derived_dir(&self.root))
    }

    /// Derive and persist the variable table for every cohort.
    ///
    /// Cohorts are independent, so a failure in one (a missing lexicon,
    /// unreadable JSON) is recorded in the summary and the rest still run.
    pub fn derive_all(&self) -> Result<DeriveSummary> {
        let store = self.store();
        let outcomes: Vec<(CohortId, Result<usize>)> = CohortId::all()
            .par_iter()
            .map(|&cohort| (cohort, self.derive_cohort(&store, cohort)))
            .collect();

        let mut summary = DeriveSummary::default();
        for (cohort, outcome) in outcomes {
            match outcome {
                Ok(rows) => summary.derived.push((cohort, rows)),
                Err(err) => {
                    warn!(cohort = %cohort, "derivation failed: {err:#}");
                    summary.failed.push((cohort, format!("{err:#}")));
                }
            }
        }
        info!("{}", summary.summary());
        Ok(summary)
    }

    fn derive_cohort(&self, store: &ArtifactStore, cohort: CohortId) -> Result<usize> {
        let shapes = KlatteseShapes;
        let similarity = KlatteseSimilarity::default();
        let subject = store::read_lexicon(&self.config.lexicon_path(&self.root, cohort))
            .with_context(|| format!("loading the {cohort} lexicon"))?;
        let reference = cohort.reference();
        let table = if reference == cohort {
            derive::derive(cohort, &subject, &subject, &shapes, &similarity)?
        } else {
            let adult = store::read_lexicon(&self.config.lexicon_path(&self.root, reference))
                .with_context(|| format!("loading the {reference} lexicon"))?;
            derive::derive(cohort, &subject, &adult, &shapes, &similarity)?
        };
        store.write_table(&table)?;
        Ok(table.len())
    }

    fn tables(&self, role: SpeakerRole) -> Result<Vec<(AgeGroup, DerivedTable)>> {
        let store = self.store();
        AgeGroup::all()
            .iter()
            .map(|&age| {
                let cohort = CohortId::new(age, role);
                let table = store.read_table(cohort).with_context(|| {
                    format!("loading the derived table for {cohort} (run `derive` first)")
                })?;
                Ok((age, table))
            })
            .collect()
    }

    /// Write the descriptive reports.
    ///
    /// The usage blocks cover both cohort families, so this stage reads the
    /// child and the adult tables. Returns the paths written.
    pub fn descriptive(&self) -> Result<Vec<PathBuf>> {
        let child = self.tables(SpeakerRole::Child)?;
        let adult = self.tables(SpeakerRole::Adult)?;
        let results = self.config.results_dir(&self.root);
        fs::create_dir_all(&results).with_context(|| format!("creating {}", results.display()))?;

        let mut written = Vec::new();
        for (file, specs) in descriptive_files() {
            let blocks: Vec<DescriptiveBlock> = specs
                .iter()
                .map(|spec| describe_block(&child, &adult, spec))
                .collect();
            let path = results.join(file);
            fs::write(&path, text::render_descriptive(&blocks))
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote descriptive report");
            written.push(path);
        }
        Ok(written)
    }

    /// Fit every study cell at every age and write the inferential reports.
    ///
    /// A cell that cannot be fit (too few usable rows, a degenerate predictor)
    /// becomes an error row in the report; the remaining cells still run.
    /// Returns the paths written.
    pub fn inferential(&self) -> Result<Vec<PathBuf>> {
        let tables = self.tables(SpeakerRole::Child)?;
        let results = self.config.results_dir(&self.root);
        fs::create_dir_all(&results).with_context(|| format!("creating {}", results.display()))?;

        let base = self.config.bootstrap_options();
        let mut written = Vec::new();
        let mut cell_index = 0u64;
        for (file, cells) in study_files() {
            let mut rows = Vec::new();
            for cell in &cells {
                for (age, table) in &tables {
                    let label = format!("{}_{}", cell.label, age);
                    // Offsetting the seed keeps cells independent while the
                    // whole run stays reproducible from one configured seed.
                    let opts = BootstrapOptions {
                        seed: base.seed.wrapping_add(cell_index),
                        ..base.clone()
                    };
                    cell_index += 1;
                    rows.push(run_cell(table, cell, &label, &opts));
                }
            }
            let path = results.join(file);
            fs::write(&path, text::render_inferential(&rows))
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "wrote inferential report");
            written.push(path);
        }
        Ok(written)
    }
}

/// Outcome of a full derivation run.
#[derive(Default, Debug)]
pub struct DeriveSummary {
    /// Cohorts derived successfully, with their row counts.
    pub derived: Vec<(CohortId, usize)>,
    /// Cohorts that failed, with the rendered failure.
    pub failed: Vec<(CohortId, String)>,
}

impl DeriveSummary {
    /// Whether every cohort derived.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        let words: usize = self.derived.iter().map(|(_, rows)| rows).sum();
        format!(
            "{} cohorts derived ({} words), {} failed",
            self.derived.len(),
            words,
            self.failed.len()
        )
    }
}

/// Which cohort family a descriptive block summarizes.
#[derive(Debug, Clone, Copy)]
enum TableSource {
    Child,
    Adult,
}

/// One variable summarized over a row subset, per age.
struct BlockSpec {
    label: &'static str,
    source: TableSource,
    select: fn(&DerivedRow) -> bool,
    value: fn(&DerivedRow) -> f64,
}

/// One regression of the study grid: adjusted use on a neighborhood variable
/// over a row subset.
struct StudyCell {
    label: &'static str,
    select: fn(&DerivedRow) -> bool,
    y: Column,
    x: Column,
}

/// Bisyllabic words of exactly five phonemes that the adults also used.
fn bisyllabic_five(row: &DerivedRow) -> bool {
    row.syllable_count == 2 && row.phoneme_count == 5 && row.token_adult > 0.0
}

fn describe_block(
    child: &[(AgeGroup, DerivedTable)],
    adult: &[(AgeGroup, DerivedTable)],
    spec: &BlockSpec,
) -> DescriptiveBlock {
    let tables = match spec.source {
        TableSource::Child => child,
        TableSource::Adult => adult,
    };
    let rows = tables
        .iter()
        .map(|(age, table)| {
            let values: Vec<f64> = table
                .rows()
                .iter()
                .filter(|row| (spec.select)(row))
                .map(spec.value)
                .filter(|v| v.is_finite())
                .collect();
            (age.name().to_string(), Describe::from_values(&values))
        })
        .collect();
    DescriptiveBlock::new(spec.label, rows)
}

fn run_cell(
    table: &DerivedTable,
    cell: &StudyCell,
    label: &str,
    opts: &BootstrapOptions,
) -> InferentialRow {
    let mut y = Vec::new();
    let mut x = Vec::new();
    let mut dropped = 0usize;
    for row in table.rows() {
        if !(cell.select)(row) {
            continue;
        }
        let yv = cell.y.value(row);
        let xv = cell.x.value(row);
        if yv.is_finite() && xv.is_finite() {
            y.push(yv);
            x.push(xv);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!(cell = label, dropped, "dropped rows with non-finite values");
    }
    match regress::confidence_interval(&y, &[x], opts) {
        Ok(ci) => InferentialRow::Fitted {
            label: label.to_string(),
            result: ci.point,
            ci_lower: ci.lower,
            ci_upper: ci.upper,
        },
        Err(err) => {
            warn!(cell = label, "cell failed: {err}");
            InferentialRow::Failed {
                label: label.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// The descriptive reports: file name and the variables each summarizes.
///
/// Each file pairs child and adult raw-usage blocks with the derived
/// variables for its word class. Adult usage is summarized from the adult
/// cohorts' own tables over the full adult vocabulary, not from the adult
/// reference columns of the child tables. Raw counts invert the stored log
/// scales: transcript columns hold `ln(count)` and come back through `exp`,
/// token columns hold `ln(1 + count)` and come back through `exp_m1`. The
/// source study applied a plain `exp` to its token columns and reported
/// every token count inflated by one; the `exp_m1` here is intentional.
fn descriptive_files() -> [(&'static str, Vec<BlockSpec>); 3] {
    [
        (
            "descriptive_all_words.csv",
            vec![
                BlockSpec {
                    label: "all words: child transcript count (raw)",
                    source: TableSource::Child,
                    select: |_| true,
                    value: |r| r.pct_child.exp(),
                },
                BlockSpec {
                    label: "all words: adult transcript count (raw)",
                    source: TableSource::Adult,
                    select: |_| true,
                    value: |r| r.pct_child.exp(),
                },
                BlockSpec {
                    label: "all words: child token count (raw)",
                    source: TableSource::Child,
                    select: |_| true,
                    value: |r| r.token_child.exp_m1(),
                },
                BlockSpec {
                    label: "all words: adult token count (raw)",
                    source: TableSource::Adult,
                    select: |_| true,
                    value: |r| r.token_child.exp_m1(),
                },
                BlockSpec {
                    label: "all words: adjusted use (order 2)",
                    source: TableSource::Child,
                    select: |_| true,
                    value: |r| r.pact_pct_pct_p2,
                },
            ],
        ),
        (
            "descriptive_positive_control.csv",
            vec![
                BlockSpec {
                    label: "cvc words: child transcript count (raw)",
                    source: TableSource::Child,
                    select: |r| RowFilter::CvcAll.matches(r),
                    value: |r| r.pct_child.exp(),
                },
                BlockSpec {
                    label: "cvc words: adult transcript count (raw)",
                    source: TableSource::Adult,
                    select: |r| RowFilter::CvcAll.matches(r),
                    value: |r| r.pct_child.exp(),
                },
                BlockSpec {
                    label: "cvc words: child token count (raw)",
                    source: TableSource::Child,
                    select: |r| RowFilter::CvcAll.matches(r),
                    value: |r| r.token_child.exp_m1(),
                },
                BlockSpec {
                    label: "cvc words: adult token count (raw)",
                    source: TableSource::Adult,
                    select: |r| RowFilter::CvcAll.matches(r),
                    value: |r| r.token_child.exp_m1(),
                },
                BlockSpec {
                    label: "cvc words: adjusted use (order 2)",
                    source: TableSource::Child,
                    select: |r| RowFilter::CvcWithAdult.matches(r),
                    value: |r| r.pact_pct_pct_p2,
                },
                BlockSpec {
                    label: "cvc words: phonemic density",
                    source: TableSource::Child,
                    select: |r| RowFilter::CvcWithAdult.matches(r),
                    value: |r| r.phonemic_density as f64,
                },
                BlockSpec {
                    label: "cvc words: neighbor frequency",
                    source: TableSource::Child,
                    select: |r| RowFilter::CvcWithAdult.matches(r),
                    value: |r| r.neighbor_frequency,
                },
                BlockSpec {
                    label: "bisyllabic five-phoneme words: neighbor frequency",
                    source: TableSource::Child,
                    select: bisyllabic_five,
                    value: |r| r.neighbor_frequency,
                },
                BlockSpec {
                    label: "bisyllabic five-phoneme words: adjusted use (order 2)",
                    source: TableSource::Child,
                    select: bisyllabic_five,
                    value: |r| r.pact_pct_pct_p2,
                },
            ],
        ),
        (
            "descriptive_multisyllabic.csv",
            vec![
                BlockSpec {
                    label: "multisyllabic words: child transcript count (raw)",
                    source: TableSource::Child,
                    select: |r| RowFilter::MultisyllabicAll.matches(r),
                    value: |r| r.pct_child.exp(),
                },
                BlockSpec {
                    label: "multisyllabic words: adult transcript count (raw)",
                    source: TableSource::Adult,
                    select: |r| RowFilter::MultisyllabicAll.matches(r),
                    value: |r| r.pct_child.exp(),
                },
                BlockSpec {
                    label: "multisyllabic words: child token count (raw)",
                    source: TableSource::Child,
                    select: |r| RowFilter::MultisyllabicAll.matches(r),
                    value: |r| r.token_child.exp_m1(),
                },
                BlockSpec {
                    label: "multisyllabic words: adult token count (raw)",
                    source: TableSource::Adult,
                    select: |r| RowFilter::MultisyllabicAll.matches(r),
                    value: |r| r.token_child.exp_m1(),
                },
                BlockSpec {
                    label: "multisyllabic words: adjusted use (order 2)",
                    source: TableSource::Child,
                    select: |r| RowFilter::MultisyllabicWithAdult.matches(r),
                    value: |r| r.pact_pct_pct_p2,
                },
                BlockSpec {
                    label: "multisyllabic words: phonemic density",
                    source: TableSource::Child,
                    select: |r| RowFilter::MultisyllabicWithAdult.matches(r),
                    value: |r| r.phonemic_density as f64,
                },
                BlockSpec {
                    label: "multisyllabic words: onset-nucleus density",
                    source: TableSource::Child,
                    select: |r| RowFilter::MultisyllabicWithAdult.matches(r),
                    value: |r| r.onset_nucleus_density as f64,
                },
                BlockSpec {
                    label: "multisyllabic words: onset-nucleus-coda density",
                    source: TableSource::Child,
                    select: |r| RowFilter::MultisyllabicWithAdult.matches(r),
                    value: |r| r.onset_nucleus_coda_density as f64,
                },
            ],
        ),
    ]
}

/// The inferential reports: file name and the study cells each covers.
/// Every cell regresses adjusted use on one neighborhood variable.
fn study_files() -> [(&'static str, Vec<StudyCell>); 2] {
    [
        (
            "inferential_positive_control.csv",
            vec![
                StudyCell {
                    label: "cvc_density",
                    select: |r| RowFilter::CvcWithAdult.matches(r),
                    y: Column::PactPctPctP2,
                    x: Column::PhonemicDensity,
                },
                StudyCell {
                    label: "cvc_frequency",
                    select: |r| RowFilter::CvcWithAdult.matches(r),
                    y: Column::PactPctPctP2,
                    x: Column::NeighborFrequency,
                },
                StudyCell {
                    label: "bisyllabic_frequency",
                    select: bisyllabic_five,
                    y: Column::PactPctPctP2,
                    x: Column::NeighborFrequency,
                },
            ],
        ),
        (
            "inferential_multisyllabic.csv",
            vec![
                StudyCell {
                    label: "multisyllabic_onset_nucleus",
                    select: |r| RowFilter::MultisyllabicWithAdult.matches(r),
                    y: Column::PactPctPctP2,
                    x: Column::OnsetNucleusDensity,
                },
                StudyCell {
                    label: "multisyllabic_onset_nucleus_coda",
                    select: |r| RowFilter::MultisyllabicWithAdult.matches(r),
                    y: Column::PactPctPctP2,
                    x: Column::OnsetNucleusCodaDensity,
                },
            ],
        ),
    ]
}
