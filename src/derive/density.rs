//! Phonological neighborhood measures.
//!
//! A word's neighborhood is the set of other lexicon words similar to it
//! under one of three notions: whole-word one-edit distance, or a shared
//! stressed onset-nucleus(-coda) substring. Similarity itself lives behind
//! [`SimilarityEngine`]; this module materializes per-word neighbor sets
//! once and answers density and neighbor-frequency queries from them.

use std::collections::{BTreeMap, BTreeSet};

use super::segments::{self, KlatteseShapes};
use super::{DeriveError, DeriveResult};
use crate::models::Lexicon;

/// Which similarity notion an index is built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    OnsetNucleus,
    OnsetNucleusCoda,
    Phonemic,
}

impl SimilarityMode {
    pub fn name(&self) -> &'static str {
        match self {
            SimilarityMode::OnsetNucleus => "onset_nucleus",
            SimilarityMode::OnsetNucleusCoda => "onset_nucleus_coda",
            SimilarityMode::Phonemic => "phonemic",
        }
    }
}

/// Similarity computation contract.
///
/// `None` means the engine has no entry for the word at all (as opposed to
/// an empty neighbor set, which is an ordinary answer). The word itself is
/// never a member of its own neighbor set.
pub trait SimilarityEngine {
    fn neighbors(
        &self,
        word: &str,
        vocabulary: &BTreeSet<String>,
        mode: SimilarityMode,
    ) -> Option<BTreeSet<String>>;
}

/// Materialized neighbor sets for one vocabulary under one mode.
#[derive(Debug, Clone)]
pub struct NeighborhoodIndex {
    mode: SimilarityMode,
    neighbors: BTreeMap<String, BTreeSet<String>>,
}

impl NeighborhoodIndex {
    /// Query the engine once per vocabulary word. Words the engine has no
    /// entry for are left out of the index and surface later as
    /// [`DeriveError::KeyNotFound`].
    pub fn build(
        engine: &dyn SimilarityEngine,
        vocabulary: &BTreeSet<String>,
        mode: SimilarityMode,
    ) -> Self {
        let mut neighbors = BTreeMap::new();
        for word in vocabulary {
            if let Some(set) = engine.neighbors(word, vocabulary, mode) {
                neighbors.insert(word.clone(), set);
            }
        }
        Self { mode, neighbors }
    }

    pub fn mode(&self) -> SimilarityMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighborhood size. A word without an index entry is an error, never
    /// a default zero: zero means "demonstrably no neighbors".
    pub fn density(&self, word: &str) -> DeriveResult<u32> {
        self.neighbors
            .get(word)
            .map(|s| s.len() as u32)
            .ok_or_else(|| DeriveError::KeyNotFound {
                word: word.to_string(),
                index: self.mode.name(),
            })
    }

    /// Mean raw adult transcript count over the word's neighbors.
    ///
    /// Neighbors missing from the adult lexicon contribute zero to the sum
    /// while still counting in the divisor. An empty neighbor set averages
    /// to 0; a word with no index entry is NaN.
    pub fn neighbor_frequency(&self, word: &str, adult: &Lexicon) -> f64 {
        match self.neighbors.get(word) {
            None => f64::NAN,
            Some(set) if set.is_empty() => 0.0,
            Some(set) => {
                let sum: f64 = set
                    .iter()
                    .map(|n| adult.get(n).map_or(0.0, |e| e.numchild))
                    .sum();
                sum / set.len() as f64
            }
        }
    }
}

/// Reference [`SimilarityEngine`] over Klattese transcriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct KlatteseSimilarity {
    shapes: KlatteseShapes,
}

impl KlatteseSimilarity {
    fn key(&self, word: &str, mode: SimilarityMode) -> String {
        match mode {
            SimilarityMode::OnsetNucleus => segments::onset_nucleus(&self.shapes, word),
            SimilarityMode::OnsetNucleusCoda => segments::onset_nucleus_coda(&self.shapes, word),
            SimilarityMode::Phonemic => segments::strip_markers(word),
        }
    }
}

impl SimilarityEngine for KlatteseSimilarity {
    fn neighbors(
        &self,
        word: &str,
        vocabulary: &BTreeSet<String>,
        mode: SimilarityMode,
    ) -> Option<BTreeSet<String>> {
        let set = match mode {
            SimilarityMode::Phonemic => {
                let target = segments::strip_markers(word);
                vocabulary
                    .iter()
                    .filter(|w| w.as_str() != word)
                    .filter(|w| one_edit_apart(&segments::strip_markers(w), &target))
                    .cloned()
                    .collect()
            }
            SimilarityMode::OnsetNucleus | SimilarityMode::OnsetNucleusCoda => {
                let key = self.key(word, mode);
                if key.is_empty() {
                    // No stressed substring to share, so no neighbors.
                    BTreeSet::new()
                } else {
                    vocabulary
                        .iter()
                        .filter(|w| w.as_str() != word)
                        .filter(|w| self.key(w, mode) == key)
                        .cloned()
                        .collect()
                }
            }
        };
        Some(set)
    }
}

/// Whether two phoneme strings differ by exactly one substitution,
/// addition, or deletion.
fn one_edit_apart(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() == b.len() {
        return a.iter().zip(&b).filter(|(x, y)| x != y).count() == 1;
    }
    let (short, long) = if a.len() < b.len() { (&a, &b) } else { (&b, &a) };
    if long.len() - short.len() != 1 {
        return false;
    }
    let mut i = 0;
    let mut j = 0;
    let mut skipped = false;
    while i < short.len() && j < long.len() {
        if short[i] == long[j] {
            i += 1;
            j += 1;
        } else if skipped {
            return false;
        } else {
            skipped = true;
            j += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordEntry;

    fn vocab(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn adult_lexicon(entries: &[(&str, f64)]) -> Lexicon {
        entries
            .iter()
            .map(|(phon, numchild)| {
                (
                    phon.to_string(),
                    WordEntry {
                        orth: phon.to_string(),
                        numchild: *numchild,
                        token: 1.0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_one_edit_apart() {
        assert!(one_edit_apart("k@t", "b@t")); // substitution
        assert!(one_edit_apart("k@t", "k@ts")); // addition at end
        assert!(one_edit_apart("k@t", "@t")); // deletion at start
        assert!(!one_edit_apart("k@t", "k@t")); // identical
        assert!(!one_edit_apart("k@t", "b@ts")); // two edits
        assert!(!one_edit_apart("k@t", "k@tsz")); // length gap of two
    }

    #[test]
    fn test_phonemic_density_counts_one_edit_neighbors() {
        let vocabulary = vocab(&["k1@t", "b1@t", "k1@ts", "k1Ip"]);
        let engine = KlatteseSimilarity::default();
        let index = NeighborhoodIndex::build(&engine, &vocabulary, SimilarityMode::Phonemic);
        // k@t vs b@t (sub) and k@ts (add); kIp is two edits away.
        assert_eq!(index.density("k1@t").unwrap(), 2);
        assert_eq!(index.density("k1Ip").unwrap(), 0);
    }

    #[test]
    fn test_stressed_substring_neighbors() {
        let vocabulary = vocab(&["b1^s_k1It", "k1It", "k1Ip", "b^s_kIt"]);
        let engine = KlatteseSimilarity::default();
        let onc = NeighborhoodIndex::build(&engine, &vocabulary, SimilarityMode::OnsetNucleusCoda);
        // biscuit's stressed syllable is exactly the word "k1It".
        assert_eq!(onc.density("b1^s_k1It").unwrap(), 1);
        let on = NeighborhoodIndex::build(&engine, &vocabulary, SimilarityMode::OnsetNucleus);
        // Trimmed to "k1I", biscuit also matches "k1Ip".
        assert_eq!(on.density("b1^s_k1It").unwrap(), 2);
        // No stressed syllable, no shared substring.
        assert_eq!(on.density("b^s_kIt").unwrap(), 0);
    }

    #[test]
    fn test_word_is_never_its_own_neighbor() {
        let vocabulary = vocab(&["k1@t"]);
        let engine = KlatteseSimilarity::default();
        for mode in [
            SimilarityMode::Phonemic,
            SimilarityMode::OnsetNucleus,
            SimilarityMode::OnsetNucleusCoda,
        ] {
            let index = NeighborhoodIndex::build(&engine, &vocabulary, mode);
            assert_eq!(index.density("k1@t").unwrap(), 0, "mode {:?}", mode);
        }
    }

    #[test]
    fn test_density_of_unindexed_word_is_an_error() {
        let vocabulary = vocab(&["k1@t"]);
        let engine = KlatteseSimilarity::default();
        let index = NeighborhoodIndex::build(&engine, &vocabulary, SimilarityMode::Phonemic);
        let err = index.density("m1aws").unwrap_err();
        assert!(matches!(err, DeriveError::KeyNotFound { .. }));
    }

    #[test]
    fn test_neighbor_frequency_divides_by_full_set() {
        let vocabulary = vocab(&["k1@t", "b1@t", "h1@t"]);
        let engine = KlatteseSimilarity::default();
        let index = NeighborhoodIndex::build(&engine, &vocabulary, SimilarityMode::Phonemic);
        // b@t present in the adult lexicon, h@t absent: (12 + 0) / 2.
        let adult = adult_lexicon(&[("b1@t", 12.0), ("k1@t", 99.0)]);
        let freq = index.neighbor_frequency("k1@t", &adult);
        assert!((freq - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_neighbor_frequency_sentinels() {
        let vocabulary = vocab(&["k1@t", "z1uS"]);
        let engine = KlatteseSimilarity::default();
        let index = NeighborhoodIndex::build(&engine, &vocabulary, SimilarityMode::Phonemic);
        let adult = adult_lexicon(&[]);
        // Demonstrably no neighbors averages to zero.
        assert_eq!(index.neighbor_frequency("k1@t", &adult), 0.0);
        // No index entry at all is NaN.
        assert!(index.neighbor_frequency("absent", &adult).is_nan());
    }
}
