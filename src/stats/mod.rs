//! Descriptive statistics over one variable's values.
//!
//! The study reports the same summary row everywhere: n, range, mean with
//! population standard deviation, median, mode, skewness, and excess
//! kurtosis. Callers select and filter the values (sentinels included or
//! not) before summarizing; this module never second-guesses its input.

/// Summary statistics of one set of values.
///
/// All fields are `f64`, including `nobs`, because the study also averages
/// these rows across ages and the averages are fractional. Skewness is the
/// biased moment coefficient `m3 / m2^1.5`; kurtosis is biased excess
/// (`m4 / m2^2 - 3`). Zero-variance input reports zero for both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Describe {
    pub nobs: f64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub mode: f64,
    pub mode_count: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl Describe {
    /// Summarize a set of values. The empty set is all zeros with `nobs`
    /// zero, which the reporters render rather than erroring on.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / n;
        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        for v in &sorted {
            let d = v - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        m2 /= n;
        m3 /= n;
        m4 /= n;

        let half = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[half - 1] + sorted[half]) / 2.0
        } else {
            sorted[half]
        };
        let (mode, mode_count) = mode_of_sorted(&sorted);

        Self {
            nobs: n,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            std: m2.sqrt(),
            median,
            mode,
            mode_count: mode_count as f64,
            skewness: if m2 > 0.0 { m3 / m2.powf(1.5) } else { 0.0 },
            kurtosis: if m2 > 0.0 { m4 / (m2 * m2) - 3.0 } else { 0.0 },
        }
    }

    /// Element-wise mean of several summary rows, the study's cross-age
    /// average row. Empty input is all zeros.
    pub fn average(items: &[Describe]) -> Describe {
        if items.is_empty() {
            return Describe::default();
        }
        let k = items.len() as f64;
        let mut out = Describe::default();
        for d in items {
            out.nobs += d.nobs;
            out.min += d.min;
            out.max += d.max;
            out.mean += d.mean;
            out.std += d.std;
            out.median += d.median;
            out.mode += d.mode;
            out.mode_count += d.mode_count;
            out.skewness += d.skewness;
            out.kurtosis += d.kurtosis;
        }
        out.nobs /= k;
        out.min /= k;
        out.max /= k;
        out.mean /= k;
        out.std /= k;
        out.median /= k;
        out.mode /= k;
        out.mode_count /= k;
        out.skewness /= k;
        out.kurtosis /= k;
        out
    }
}

/// Most frequent exact value and its count; the smallest such value on a
/// tie. Input must be sorted.
fn mode_of_sorted(sorted: &[f64]) -> (f64, usize) {
    let mut best = sorted[0];
    let mut best_count = 1;
    let mut run_value = sorted[0];
    let mut run_count = 1;
    for &v in &sorted[1..] {
        if v == run_value {
            run_count += 1;
        } else {
            run_value = v;
            run_count = 1;
        }
        if run_count > best_count {
            best = run_value;
            best_count = run_count;
        }
    }
    (best, best_count)
}
