//! Log-scaling of raw usage counts.
//!
//! Transcript counts are heavily right-skewed, so the study works on a log
//! scale: natural log for the transcript-presence count, log(1+x) for the
//! token count (which may legitimately be zero more often).

use crate::models::WordEntry;

/// The four log-scaled usage measures for one word.
#[derive(Debug, Clone, Copy)]
pub struct UsageMeasures {
    pub pct_child: f64,
    pub pct_adult: f64,
    pub token_child: f64,
    pub token_adult: f64,
}

/// Log-scale a word's counts against its optional adult reference entry.
///
/// The child-side measures are always defined (the word comes from the
/// subject lexicon). When the word is absent from the adult reference, both
/// adult measures are NaN, the explicit "no data" sentinel that downstream
/// masks exclude. A count of zero log-scales to `-inf`, which is a defined
/// value and is never rewritten into NaN.
pub fn normalize(child: &WordEntry, adult: Option<&WordEntry>) -> UsageMeasures {
    UsageMeasures {
        pct_child: child.numchild.ln(),
        token_child: child.token.ln_1p(),
        pct_adult: adult.map_or(f64::NAN, |e| e.numchild.ln()),
        token_adult: adult.map_or(f64::NAN, |e| e.token.ln_1p()),
    }
}
