//! JSON persistence: derived-table artifacts and lexicon input.
//!
//! One artifact file per cohort under the configured directory, named by
//! the cohort stem (`three_child.json` and so on). Lexicons are read-only
//! input prepared by the external transcript step.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::{CohortId, DerivedTable, Lexicon};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{path} does not exist; derive the cohort tables first")]
    Missing { path: PathBuf },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One persisted derivation output with its generation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub generated_at: DateTime<Utc>,
    pub table: DerivedTable,
}

/// Derived-table artifacts under one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, cohort: CohortId) -> PathBuf {
        self.root.join(format!("{}.json", cohort.stem()))
    }

    pub fn write_table(&self, table: &DerivedTable) -> StoreResult<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.table_path(table.cohort);
        let artifact = Artifact {
            generated_at: Utc::now(),
            table: table.clone(),
        };
        let json = serde_json::to_string_pretty(&artifact).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), rows = table.len(), "wrote derived table");
        Ok(path)
    }

    pub fn read_table(&self, cohort: CohortId) -> StoreResult<DerivedTable> {
        Ok(self.read_artifact(cohort)?.table)
    }

    pub fn read_artifact(&self, cohort: CohortId) -> StoreResult<Artifact> {
        let path = self.table_path(cohort);
        if !path.exists() {
            return Err(StoreError::Missing { path });
        }
        let data = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| StoreError::Json { path, source })
    }
}

/// Load an externally prepared lexicon: a JSON object mapping phonological
/// form to `{orth, numchild, token}`.
pub fn read_lexicon(path: &Path) -> StoreResult<Lexicon> {
    if !path.exists() {
        return Err(StoreError::Missing {
            path: path.to_path_buf(),
        });
    }
    let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
