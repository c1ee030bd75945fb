//! Segment features of a phonological transcription.
//!
//! Transcriptions arrive in Klattese: one character per phoneme, `_` between
//! syllables, `1` immediately before the vowel of the primary-stressed
//! syllable ("biscuit" is `b1^s_k1It`). Syllable segmentation and CV-shape
//! classification sit behind the [`SyllableShape`] trait so the feature
//! functions stay independent of any particular transcription scheme.

use tracing::warn;

/// Syllable separator in Klattese transcriptions.
pub const SYLLABLE_SEPARATOR: char = '_';
/// Primary stress marker in Klattese transcriptions.
pub const STRESS_MARKER: char = '1';

/// Klattese characters that can serve as a syllable nucleus.
const KLATTESE_NUCLEI: &str = "iIeE@a^coOuUWYxR";

/// CV-shape class of a transcription.
///
/// `Cvc` is the irregular one-syllable consonant-vowel-consonant class the
/// study treats separately from ordinary monosyllables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvShape {
    Cvc,
    Other,
}

/// Syllable segmentation and shape classification contract.
///
/// The derivation pipeline only ever talks to this trait; [`KlatteseShapes`]
/// is the reference implementation for the study's own transcriptions.
pub trait SyllableShape {
    /// Ordered syllable segments of a transcription. Never empty: a
    /// separator-free transcription is its own single segment.
    fn segment<'a>(&self, phon: &'a str) -> Vec<&'a str>;

    /// CV-shape class of the whole transcription.
    fn shape(&self, phon: &str) -> CvShape;

    /// Whether a phoneme character can serve as a syllable nucleus.
    fn is_nucleus(&self, ch: char) -> bool;
}

/// [`SyllableShape`] over Klattese transcriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct KlatteseShapes;

impl SyllableShape for KlatteseShapes {
    fn segment<'a>(&self, phon: &'a str) -> Vec<&'a str> {
        phon.split(SYLLABLE_SEPARATOR).collect()
    }

    fn shape(&self, phon: &str) -> CvShape {
        if phon.contains(SYLLABLE_SEPARATOR) {
            return CvShape::Other;
        }
        let phonemes: Vec<char> = strip_markers(phon).chars().collect();
        match phonemes.as_slice() {
            [onset, nucleus, coda]
                if !self.is_nucleus(*onset)
                    && self.is_nucleus(*nucleus)
                    && !self.is_nucleus(*coda) =>
            {
                CvShape::Cvc
            }
            _ => CvShape::Other,
        }
    }

    fn is_nucleus(&self, ch: char) -> bool {
        KLATTESE_NUCLEI.contains(ch)
    }
}

/// Remove syllable separators and the stress marker, leaving one character
/// per phoneme.
pub fn strip_markers(phon: &str) -> String {
    phon.chars()
        .filter(|&c| c != SYLLABLE_SEPARATOR && c != STRESS_MARKER)
        .collect()
}

/// Syllable length class: the literal count for multisyllables, `0` for the
/// irregular CVC class, `1` for every other monosyllable.
pub fn syllable_count(shapes: &dyn SyllableShape, phon: &str) -> u32 {
    let n = shapes.segment(phon).len();
    if n > 1 {
        n as u32
    } else if shapes.shape(phon) == CvShape::Cvc {
        0
    } else {
        1
    }
}

/// Number of phonemes in the transcription.
pub fn phoneme_count(phon: &str) -> u32 {
    strip_markers(phon).chars().count() as u32
}

/// 1-based index of the stressed syllable, or `-1` when no syllable carries
/// the marker. A transcription marking more than one syllable resolves to
/// the last marked one, the same syllable the stressed-substring features
/// use. The sentinel case is an anomaly in the source transcriptions and is
/// logged, not fatal.
pub fn stress_position(shapes: &dyn SyllableShape, phon: &str) -> i32 {
    for (i, syll) in shapes.segment(phon).iter().enumerate().rev() {
        if syll.contains(STRESS_MARKER) {
            return (i + 1) as i32;
        }
    }
    warn!("{phon:?}: no primary stress marker, position recorded as -1");
    -1
}

/// The syllable the stressed-substring features operate on: the last marked
/// segment of a multisyllable, or the whole transcription of a monosyllable.
/// A multisyllable with no stressed segment yields `None`.
fn stressed_segment<'a>(shapes: &dyn SyllableShape, phon: &'a str) -> Option<&'a str> {
    let segments = shapes.segment(phon);
    if segments.len() <= 1 {
        return segments.first().copied();
    }
    segments.into_iter().rev().find(|s| s.contains(STRESS_MARKER))
}

/// The stressed syllable unmodified, coda included. Empty string when a
/// multisyllable has no stressed segment.
pub fn onset_nucleus_coda(shapes: &dyn SyllableShape, phon: &str) -> String {
    stressed_segment(shapes, phon).unwrap_or("").to_string()
}

/// The stressed syllable with trailing coda consonants removed, so the
/// substring ends at its nucleus. Empty string when a multisyllable has no
/// stressed segment, or when the segment has no nucleus at all.
pub fn onset_nucleus(shapes: &dyn SyllableShape, phon: &str) -> String {
    let syll = stressed_segment(shapes, phon).unwrap_or("");
    syll.trim_end_matches(|c: char| !shapes.is_nucleus(c))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biscuit_features() {
        let shapes = KlatteseShapes;
        let phon = "b1^s_k1It";
        assert_eq!(shapes.segment(phon), vec!["b1^s", "k1It"]);
        assert_eq!(syllable_count(&shapes, phon), 2);
        assert_eq!(phoneme_count(phon), 6);
        assert_eq!(stress_position(&shapes, phon), 2);
        assert_eq!(onset_nucleus_coda(&shapes, phon), "k1It");
        assert_eq!(onset_nucleus(&shapes, phon), "k1I");
    }

    #[test]
    fn test_double_marked_words_resolve_to_the_later_syllable() {
        let shapes = KlatteseShapes;
        // Both syllables carry a marker; position and the stressed
        // substrings must all come from the later one.
        assert_eq!(stress_position(&shapes, "d1Ik_t1e"), 2);
        assert_eq!(onset_nucleus_coda(&shapes, "d1Ik_t1e"), "t1e");
        assert_eq!(onset_nucleus(&shapes, "d1Ik_t1e"), "t1e");
        // Markers on the first two syllables of three.
        assert_eq!(stress_position(&shapes, "k1an_v1Rs_ES"), 2);
        assert_eq!(onset_nucleus_coda(&shapes, "k1an_v1Rs_ES"), "v1Rs");
        assert_eq!(onset_nucleus(&shapes, "k1an_v1Rs_ES"), "v1R");
    }

    #[test]
    fn test_cvc_class_monosyllable_counts_as_zero() {
        let shapes = KlatteseShapes;
        assert_eq!(shapes.shape("k1@t"), CvShape::Cvc);
        assert_eq!(syllable_count(&shapes, "k1@t"), 0);
        assert_eq!(syllable_count(&shapes, "d1ag"), 0);
    }

    #[test]
    fn test_ordinary_monosyllables_count_as_one() {
        let shapes = KlatteseShapes;
        // Four phonemes, so not the CVC class.
        assert_eq!(shapes.shape("gr1in"), CvShape::Other);
        assert_eq!(syllable_count(&shapes, "gr1in"), 1);
        // Vowel-initial.
        assert_eq!(syllable_count(&shapes, "1@t"), 1);
        // Open syllable: consonant-consonant-vowel.
        assert_eq!(syllable_count(&shapes, "tr1i"), 1);
    }

    #[test]
    fn test_monosyllable_stressed_substrings_use_whole_word() {
        let shapes = KlatteseShapes;
        assert_eq!(onset_nucleus_coda(&shapes, "k1@t"), "k1@t");
        assert_eq!(onset_nucleus(&shapes, "k1@t"), "k1@");
    }

    #[test]
    fn test_missing_stress_marker_yields_sentinels() {
        let shapes = KlatteseShapes;
        assert_eq!(stress_position(&shapes, "b^s_kIt"), -1);
        assert_eq!(onset_nucleus_coda(&shapes, "b^s_kIt"), "");
        assert_eq!(onset_nucleus(&shapes, "b^s_kIt"), "");
    }

    #[test]
    fn test_phoneme_count_ignores_markers_only() {
        assert_eq!(phoneme_count("k1@t"), 3);
        assert_eq!(phoneme_count("b1^s_k1It"), 6);
        assert_eq!(phoneme_count(""), 0);
    }
}
