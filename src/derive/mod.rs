//! Variable derivation: one cohort lexicon in, one derived table out.
//!
//! The orchestrator composes the leaf stages in dependency order: log-scaled
//! usage, segment features, neighborhood measures, then the residualized
//! frequency-adjusted-use columns. It owns no phonological knowledge itself;
//! segmentation and similarity come in through the [`SyllableShape`] and
//! [`SimilarityEngine`] contracts.

pub mod density;
pub mod frequency;
pub mod pact;
pub mod segments;

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{CohortId, Column, DerivedRow, DerivedTable, Lexicon};

pub use density::{KlatteseSimilarity, NeighborhoodIndex, SimilarityEngine, SimilarityMode};
pub use pact::{PactError, PolyOrder};
pub use segments::{CvShape, KlatteseShapes, SyllableShape};

use pact::residualize;

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("word {word:?} missing from the {index} neighborhood index")]
    KeyNotFound { word: String, index: &'static str },
}

pub type DeriveResult<T> = Result<T, DeriveError>;

/// Derive the full variable table for one cohort.
///
/// `subject` is the lexicon the rows come from; `adult` is the same-age
/// adult lexicon serving as the frequency reference (an adult cohort passes
/// its own lexicon). The result has exactly one row per subject word.
///
/// The three neighborhood indexes are built up front over the subject
/// vocabulary and passed into row construction as plain values, so every
/// similarity answer a row uses is pinned before any row exists.
pub fn derive(
    cohort: CohortId,
    subject: &Lexicon,
    adult: &Lexicon,
    shapes: &dyn SyllableShape,
    similarity: &dyn SimilarityEngine,
) -> DeriveResult<DerivedTable> {
    let vocabulary: BTreeSet<String> = subject.keys().cloned().collect();
    debug!(
        cohort = %cohort,
        words = vocabulary.len(),
        "building neighborhood indexes"
    );
    let on_index = NeighborhoodIndex::build(similarity, &vocabulary, SimilarityMode::OnsetNucleus);
    let onc_index =
        NeighborhoodIndex::build(similarity, &vocabulary, SimilarityMode::OnsetNucleusCoda);
    let sad_index = NeighborhoodIndex::build(similarity, &vocabulary, SimilarityMode::Phonemic);

    let mut rows = Vec::with_capacity(subject.len());
    for (phon, entry) in subject {
        let usage = frequency::normalize(entry, adult.get(phon));
        rows.push(DerivedRow {
            phon: phon.clone(),
            orth: entry.orth.clone(),
            pct_child: usage.pct_child,
            pct_adult: usage.pct_adult,
            token_child: usage.token_child,
            token_adult: usage.token_adult,
            syllable_count: segments::syllable_count(shapes, phon),
            phoneme_count: segments::phoneme_count(phon),
            stress_position: segments::stress_position(shapes, phon),
            onset_nucleus: segments::onset_nucleus(shapes, phon),
            onset_nucleus_coda: segments::onset_nucleus_coda(shapes, phon),
            onset_nucleus_density: on_index.density(phon)?,
            onset_nucleus_coda_density: onc_index.density(phon)?,
            phonemic_density: sad_index.density(phon)?,
            neighbor_frequency: sad_index.neighbor_frequency(phon, adult),
            pact_pct_token_p1: f64::NAN,
            pact_pct_token_p2: f64::NAN,
            pact_token_token_p1: f64::NAN,
            pact_token_token_p2: f64::NAN,
            pact_pct_pct_p1: f64::NAN,
            pact_pct_pct_p2: f64::NAN,
        });
    }

    apply_pact_columns(cohort, &mut rows);
    info!(cohort = %cohort, rows = rows.len(), "derived variable table");
    Ok(DerivedTable::from_rows(cohort, rows))
}

/// Fill the six frequency-adjusted-use columns.
///
/// Each column masks on its own reference measure, so a word lacking one
/// adult measure can still enter fits that reference another. A column
/// whose fit fails (too few reference points, degenerate reference,
/// non-finite target) is left entirely NaN for this cohort and logged; the
/// other columns and the table itself are unaffected.
fn apply_pact_columns(cohort: CohortId, rows: &mut [DerivedRow]) {
    let specs: [(Column, Column, Column, PolyOrder, fn(&mut DerivedRow, f64)); 6] = [
        (
            Column::PactPctTokenP1,
            Column::TokenAdult,
            Column::PctChild,
            PolyOrder::Linear,
            |r, v| r.pact_pct_token_p1 = v,
        ),
        (
            Column::PactPctTokenP2,
            Column::TokenAdult,
            Column::PctChild,
            PolyOrder::Quadratic,
            |r, v| r.pact_pct_token_p2 = v,
        ),
        (
            Column::PactTokenTokenP1,
            Column::TokenAdult,
            Column::TokenChild,
            PolyOrder::Linear,
            |r, v| r.pact_token_token_p1 = v,
        ),
        (
            Column::PactTokenTokenP2,
            Column::TokenAdult,
            Column::TokenChild,
            PolyOrder::Quadratic,
            |r, v| r.pact_token_token_p2 = v,
        ),
        (
            Column::PactPctPctP1,
            Column::PctAdult,
            Column::PctChild,
            PolyOrder::Linear,
            |r, v| r.pact_pct_pct_p1 = v,
        ),
        (
            Column::PactPctPctP2,
            Column::PctAdult,
            Column::PctChild,
            PolyOrder::Quadratic,
            |r, v| r.pact_pct_pct_p2 = v,
        ),
    ];
    for (column, reference, target, order, set) in specs {
        let x: Vec<f64> = rows.iter().map(|r| reference.value(r)).collect();
        let y: Vec<f64> = rows.iter().map(|r| target.value(r)).collect();
        match residualize(&x, &y, order) {
            Ok(resid) => {
                for (row, v) in rows.iter_mut().zip(resid) {
                    set(row, v);
                }
            }
            Err(err) => {
                warn!(cohort = %cohort, column = column.name(), "column left as NaN: {err}");
            }
        }
    }
}
