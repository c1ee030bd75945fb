//! Core data models for Phonpact
//!
//! These models are shared across the derivation pipeline, the regression
//! engine, and the reporters: cohort identity, raw lexicon entries, derived
//! variable rows, and regression summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// serde adapter for floats that may be NaN or infinite.
///
/// JSON has no literal for non-finite numbers and serde_json would write
/// `null` (unreadable back into `f64`). `NaN` marks an absent measure and
/// `-inf` a log-scaled zero count; the two must survive a round trip as
/// distinct values, so non-finite floats are written as string literals.
pub(crate) mod float_json {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
        if v.is_finite() {
            s.serialize_f64(*v)
        } else if v.is_nan() {
            s.serialize_str("NaN")
        } else if *v > 0.0 {
            s.serialize_str("inf")
        } else {
            s.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Num(v) => Ok(v),
            Repr::Text(t) => match t.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(serde::de::Error::custom(format!(
                    "unrecognized float literal: {other}"
                ))),
            },
        }
    }
}

/// A single word's raw usage counts in one cohort lexicon.
///
/// `numchild` is the number (or percentage) of transcripts containing the
/// word; `token` is its total occurrence count. Both come from the external
/// transcript preparation step and are taken as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    /// Orthographic form, carried through for report readability.
    pub orth: String,
    pub numchild: f64,
    pub token: f64,
}

/// One cohort's lexicon, keyed by phonological (Klattese) form.
///
/// BTreeMap keeps row order deterministic across runs.
pub type Lexicon = BTreeMap<String, WordEntry>;

/// Age bands sampled by the study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Three,
    Four,
    Six,
}

impl AgeGroup {
    pub fn all() -> [AgeGroup; 3] {
        [AgeGroup::Three, AgeGroup::Four, AgeGroup::Six]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AgeGroup::Three => "three",
            AgeGroup::Four => "four",
            AgeGroup::Six => "six",
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Who produced the transcripts a lexicon was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    Child,
    Adult,
}

impl SpeakerRole {
    pub fn name(&self) -> &'static str {
        match self {
            SpeakerRole::Child => "child",
            SpeakerRole::Adult => "adult",
        }
    }
}

impl std::fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One of the six study cohorts (age band x speaker role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CohortId {
    pub age: AgeGroup,
    pub role: SpeakerRole,
}

impl CohortId {
    pub fn new(age: AgeGroup, role: SpeakerRole) -> Self {
        Self { age, role }
    }

    /// All six cohorts in a fixed order (ages ascending, child before adult).
    pub fn all() -> [CohortId; 6] {
        [
            CohortId::new(AgeGroup::Three, SpeakerRole::Child),
            CohortId::new(AgeGroup::Three, SpeakerRole::Adult),
            CohortId::new(AgeGroup::Four, SpeakerRole::Child),
            CohortId::new(AgeGroup::Four, SpeakerRole::Adult),
            CohortId::new(AgeGroup::Six, SpeakerRole::Child),
            CohortId::new(AgeGroup::Six, SpeakerRole::Adult),
        ]
    }

    /// The same-age adult cohort used as this cohort's frequency reference.
    ///
    /// Adult cohorts reference themselves: their derived variables are
    /// computed against their own usage, the same way the child tables are.
    pub fn reference(&self) -> CohortId {
        CohortId::new(self.age, SpeakerRole::Adult)
    }

    /// Stable artifact / file-stem name, e.g. `three_child`.
    pub fn stem(&self) -> String {
        format!("{}_{}", self.age, self.role)
    }
}

impl std::fmt::Display for CohortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stem())
    }
}

/// All derived variables for one word in one cohort.
///
/// Numeric fields are either a defined real number or an explicit sentinel:
/// `NaN` for "no data" (word absent from the adult reference, or excluded
/// from a residual fit), `-1` for "no stressed syllable found". A `-inf`
/// produced by log-scaling a zero count is a defined value, not a sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedRow {
    pub phon: String,
    pub orth: String,

    // Log-scaled usage (4 measures; adult side NaN when the word is
    // absent from the adult reference lexicon).
    #[serde(with = "float_json")]
    pub pct_child: f64,
    #[serde(with = "float_json")]
    pub pct_adult: f64,
    #[serde(with = "float_json")]
    pub token_child: f64,
    #[serde(with = "float_json")]
    pub token_adult: f64,

    // Segment features. `syllable_count` is a length class, not a literal
    // count: 0 = irregular CVC-class monosyllable, 1 = other monosyllable,
    // >1 = actual syllable count.
    pub syllable_count: u32,
    pub phoneme_count: u32,
    /// 1-based syllable index carrying primary stress; -1 when no stress
    /// marker was found.
    pub stress_position: i32,
    pub onset_nucleus: String,
    pub onset_nucleus_coda: String,

    // Neighborhood measures.
    pub onset_nucleus_density: u32,
    pub onset_nucleus_coda_density: u32,
    pub phonemic_density: u32,
    /// Mean raw adult transcript count over the word's one-edit neighbors.
    #[serde(with = "float_json")]
    pub neighbor_frequency: f64,

    // Frequency-adjusted use: residuals of a child measure on an adult
    // reference measure, per polynomial order. NaN outside the fit mask.
    #[serde(with = "float_json")]
    pub pact_pct_token_p1: f64,
    #[serde(with = "float_json")]
    pub pact_pct_token_p2: f64,
    #[serde(with = "float_json")]
    pub pact_token_token_p1: f64,
    #[serde(with = "float_json")]
    pub pact_token_token_p2: f64,
    #[serde(with = "float_json")]
    pub pact_pct_pct_p1: f64,
    #[serde(with = "float_json")]
    pub pact_pct_pct_p2: f64,
}

/// Typed handle for the numeric columns of a [`DerivedRow`].
///
/// Study cells and reporters name columns through this enum rather than by
/// string key, so a misspelled column is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    PctChild,
    PctAdult,
    TokenChild,
    TokenAdult,
    SyllableCount,
    PhonemeCount,
    StressPosition,
    OnsetNucleusDensity,
    OnsetNucleusCodaDensity,
    PhonemicDensity,
    NeighborFrequency,
    PactPctTokenP1,
    PactPctTokenP2,
    PactTokenTokenP1,
    PactTokenTokenP2,
    PactPctPctP1,
    PactPctPctP2,
}

impl Column {
    pub fn all() -> [Column; 17] {
        [
            Column::PctChild,
            Column::PctAdult,
            Column::TokenChild,
            Column::TokenAdult,
            Column::SyllableCount,
            Column::PhonemeCount,
            Column::StressPosition,
            Column::OnsetNucleusDensity,
            Column::OnsetNucleusCodaDensity,
            Column::PhonemicDensity,
            Column::NeighborFrequency,
            Column::PactPctTokenP1,
            Column::PactPctTokenP2,
            Column::PactTokenTokenP1,
            Column::PactTokenTokenP2,
            Column::PactPctPctP1,
            Column::PactPctPctP2,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Column::PctChild => "pct_child",
            Column::PctAdult => "pct_adult",
            Column::TokenChild => "token_child",
            Column::TokenAdult => "token_adult",
            Column::SyllableCount => "syllable_count",
            Column::PhonemeCount => "phoneme_count",
            Column::StressPosition => "stress_position",
            Column::OnsetNucleusDensity => "onset_nucleus_density",
            Column::OnsetNucleusCodaDensity => "onset_nucleus_coda_density",
            Column::PhonemicDensity => "phonemic_density",
            Column::NeighborFrequency => "neighbor_frequency",
            Column::PactPctTokenP1 => "pact_pct_token_p1",
            Column::PactPctTokenP2 => "pact_pct_token_p2",
            Column::PactTokenTokenP1 => "pact_token_token_p1",
            Column::PactTokenTokenP2 => "pact_token_token_p2",
            Column::PactPctPctP1 => "pact_pct_pct_p1",
            Column::PactPctPctP2 => "pact_pct_pct_p2",
        }
    }

    pub fn value(&self, row: &DerivedRow) -> f64 {
        match self {
            Column::PctChild => row.pct_child,
            Column::PctAdult => row.pct_adult,
            Column::TokenChild => row.token_child,
            Column::TokenAdult => row.token_adult,
            Column::SyllableCount => row.syllable_count as f64,
            Column::PhonemeCount => row.phoneme_count as f64,
            Column::StressPosition => row.stress_position as f64,
            Column::OnsetNucleusDensity => row.onset_nucleus_density as f64,
            Column::OnsetNucleusCodaDensity => row.onset_nucleus_coda_density as f64,
            Column::PhonemicDensity => row.phonemic_density as f64,
            Column::NeighborFrequency => row.neighbor_frequency,
            Column::PactPctTokenP1 => row.pact_pct_token_p1,
            Column::PactPctTokenP2 => row.pact_pct_token_p2,
            Column::PactTokenTokenP1 => row.pact_token_token_p1,
            Column::PactTokenTokenP2 => row.pact_token_token_p2,
            Column::PactPctPctP1 => row.pact_pct_pct_p1,
            Column::PactPctPctP2 => row.pact_pct_pct_p2,
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Row subsets the study analyzes.
///
/// "WithAdult" variants additionally require a finite adult token measure,
/// i.e. the word is present in the same-age adult lexicon at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowFilter {
    MultisyllabicWithAdult,
    CvcWithAdult,
    MultisyllabicAll,
    CvcAll,
}

impl RowFilter {
    pub fn name(&self) -> &'static str {
        match self {
            RowFilter::MultisyllabicWithAdult => "multisyllabic_with_adult",
            RowFilter::CvcWithAdult => "cvc_with_adult",
            RowFilter::MultisyllabicAll => "multisyllabic_all",
            RowFilter::CvcAll => "cvc_all",
        }
    }

    pub fn matches(&self, row: &DerivedRow) -> bool {
        match self {
            RowFilter::MultisyllabicWithAdult => {
                row.syllable_count > 1 && row.token_adult.is_finite()
            }
            RowFilter::CvcWithAdult => row.syllable_count == 0 && row.token_adult.is_finite(),
            RowFilter::MultisyllabicAll => row.syllable_count > 1,
            RowFilter::CvcAll => row.syllable_count == 0,
        }
    }
}

/// The derived-variable table for one cohort.
///
/// Rows are kept sorted by phonological form; the row set is exactly the
/// key set of the cohort's subject lexicon. Rows are never mutated after
/// derivation completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedTable {
    pub cohort: CohortId,
    rows: Vec<DerivedRow>,
}

impl DerivedTable {
    pub fn from_rows(cohort: CohortId, mut rows: Vec<DerivedRow>) -> Self {
        rows.sort_by(|a, b| a.phon.cmp(&b.phon));
        Self { cohort, rows }
    }

    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, phon: &str) -> Option<&DerivedRow> {
        self.rows
            .binary_search_by(|row| row.phon.as_str().cmp(phon))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Boolean row mask for a filter, aligned with `rows()`.
    pub fn mask(&self, filter: RowFilter) -> Vec<bool> {
        self.rows.iter().map(|r| filter.matches(r)).collect()
    }

    /// Rows passing a filter, in table order.
    pub fn select(&self, filter: RowFilter) -> Vec<&DerivedRow> {
        self.rows.iter().filter(|r| filter.matches(r)).collect()
    }

    /// One column across all rows, in table order.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.rows.iter().map(|r| column.value(r)).collect()
    }
}

/// Summary of one ordinary least squares fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionResult {
    pub nobs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    #[serde(with = "float_json")]
    pub f_statistic: f64,
    #[serde(with = "float_json")]
    pub f_pvalue: f64,
    #[serde(with = "float_json")]
    pub r_squared: f64,
}
