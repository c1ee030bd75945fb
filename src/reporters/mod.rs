//! Report rendering for the study outputs.
//!
//! Reports are delimited text meant for reading, not re-parsing: the JSON
//! artifacts are the machine surface. The pipeline assembles the row types
//! here; `text` turns them into file contents.

pub mod text;

use crate::models::RegressionResult;
use crate::stats::Describe;

/// One labeled descriptive block: a summary row per age plus the cross-age
/// average row.
#[derive(Debug, Clone)]
pub struct DescriptiveBlock {
    pub label: String,
    pub rows: Vec<(String, Describe)>,
    pub average: Describe,
}

impl DescriptiveBlock {
    pub fn new(label: impl Into<String>, rows: Vec<(String, Describe)>) -> Self {
        let stats: Vec<Describe> = rows.iter().map(|(_, d)| d.clone()).collect();
        Self {
            label: label.into(),
            rows,
            average: Describe::average(&stats),
        }
    }
}

/// One inferential report row: a fitted cell, or why the cell failed.
///
/// Failed cells stay in the report, so the output always accounts for
/// every cell the study attempted.
#[derive(Debug, Clone)]
pub enum InferentialRow {
    Fitted {
        label: String,
        result: RegressionResult,
        ci_lower: f64,
        ci_upper: f64,
    },
    Failed {
        label: String,
        reason: String,
    },
}

impl InferentialRow {
    pub fn label(&self) -> &str {
        match self {
            InferentialRow::Fitted { label, .. } => label,
            InferentialRow::Failed { label, .. } => label,
        }
    }
}
