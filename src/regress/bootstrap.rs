//! Bootstrap confidence intervals for R-squared.
//!
//! The interval comes from refitting on rows drawn with replacement and
//! reading percentiles off the resulting R-squared distribution. Resampling
//! is seeded by the caller, so a study run is reproducible end to end.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::{fit, RegressError, RegressResult};
use crate::models::RegressionResult;

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Resample draws to attempt.
    pub iterations: usize,
    /// Central interval mass, e.g. 0.95 for a 95% interval.
    pub alpha: f64,
    /// Seed for the resampling stream.
    pub seed: u64,
    /// Abort once singular draws exceed this share of `iterations`.
    pub max_singular_ratio: f64,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            iterations: 1000,
            alpha: 0.95,
            seed: 0,
            max_singular_ratio: 0.5,
        }
    }
}

impl BootstrapOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

/// R-squared values recorded from the successful draws, plus the count of
/// singular draws that were excluded.
#[derive(Debug, Clone, Default)]
pub struct BootstrapDistribution {
    values: Vec<f64>,
    pub excluded: usize,
}

impl BootstrapDistribution {
    fn with_capacity(n: usize) -> Self {
        Self {
            values: Vec::with_capacity(n),
            excluded: 0,
        }
    }

    fn record(&mut self, r_squared: f64) {
        self.values.push(r_squared);
    }

    fn sort(&mut self) {
        self.values.sort_by(f64::total_cmp);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Percentile by linear interpolation between closest ranks. Assumes
    /// the values are sorted; NaN on an empty distribution.
    pub fn percentile(&self, pct: f64) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        let rank = pct / 100.0 * (self.values.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        if hi >= self.values.len() {
            return self.values[self.values.len() - 1];
        }
        let frac = rank - lo as f64;
        self.values[lo] + frac * (self.values[hi] - self.values[lo])
    }
}

/// One fitted cell with its bootstrap interval.
///
/// The interval brackets the resample distribution, not the point estimate;
/// with skewed data the point value can land outside it.
#[derive(Debug, Clone)]
pub struct CiReport {
    pub point: RegressionResult,
    pub lower: f64,
    pub upper: f64,
    pub samples: usize,
    pub excluded: usize,
}

/// Fit once on the full rows for the point estimate, then bootstrap the
/// R-squared interval.
///
/// Each draw picks `y.len()` rows uniformly with replacement and refits.
/// A singular draw is excluded and counted; when exclusions exceed
/// `max_singular_ratio * iterations` the cell aborts with
/// [`RegressError::ExcessiveSingularDraws`] instead of reporting an
/// interval built from a distribution that mostly failed. Bounds are
/// clamped into [0, 1].
pub fn confidence_interval(
    y: &[f64],
    xs: &[Vec<f64>],
    opts: &BootstrapOptions,
) -> RegressResult<CiReport> {
    let point = fit(y, xs)?;
    let n = y.len();
    let max_excluded = (opts.max_singular_ratio * opts.iterations as f64) as usize;

    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
    let mut dist = BootstrapDistribution::with_capacity(opts.iterations);
    let mut draw_y = vec![0.0; n];
    let mut draw_xs: Vec<Vec<f64>> = vec![vec![0.0; n]; xs.len()];

    for attempt in 0..opts.iterations {
        for slot in 0..n {
            let pick = rng.random_range(0..n);
            draw_y[slot] = y[pick];
            for (col, x) in draw_xs.iter_mut().zip(xs) {
                col[slot] = x[pick];
            }
        }
        match fit(&draw_y, &draw_xs) {
            Ok(r) => dist.record(r.r_squared),
            Err(RegressError::Singular) => {
                dist.excluded += 1;
                if dist.excluded > max_excluded {
                    return Err(RegressError::ExcessiveSingularDraws {
                        excluded: dist.excluded,
                        attempted: attempt + 1,
                    });
                }
            }
            Err(other) => return Err(other),
        }
    }

    dist.sort();
    let lower = dist.percentile((1.0 - opts.alpha) / 2.0 * 100.0).clamp(0.0, 1.0);
    let upper = dist.percentile((1.0 + opts.alpha) / 2.0 * 100.0).clamp(0.0, 1.0);
    debug!(
        samples = dist.len(),
        excluded = dist.excluded,
        "bootstrap distribution complete"
    );
    Ok(CiReport {
        point,
        lower,
        upper,
        samples: dist.len(),
        excluded: dist.excluded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noisy_line() -> (Vec<f64>, Vec<Vec<f64>>) {
        let x: Vec<f64> = (1..=12).map(|v| v as f64).collect();
        let y = vec![1.4, 1.9, 3.2, 4.1, 4.8, 6.3, 6.9, 8.2, 8.8, 10.1, 10.9, 12.3];
        (y, vec![x])
    }

    #[test]
    fn test_interval_bounds_are_ordered_and_clamped() {
        let (y, xs) = noisy_line();
        let opts = BootstrapOptions::default().with_iterations(200).with_seed(11);
        let ci = confidence_interval(&y, &xs, &opts).unwrap();
        assert!(ci.lower <= ci.upper);
        assert!((0.0..=1.0).contains(&ci.lower));
        assert!((0.0..=1.0).contains(&ci.upper));
        assert_eq!(ci.samples + ci.excluded, 200);
        assert!(ci.point.r_squared > 0.9);
    }

    #[test]
    fn test_same_seed_reproduces_the_interval() {
        let (y, xs) = noisy_line();
        let opts = BootstrapOptions::default().with_iterations(150).with_seed(42);
        let a = confidence_interval(&y, &xs, &opts).unwrap();
        let b = confidence_interval(&y, &xs, &opts).unwrap();
        assert_eq!(a.lower, b.lower);
        assert_eq!(a.upper, b.upper);
        assert_eq!(a.point.r_squared, b.point.r_squared);
        assert_eq!(a.excluded, b.excluded);
    }

    #[test]
    fn test_singular_heavy_data_aborts_early() {
        // Most draws of this predictor are constant, so with a zero
        // tolerance the first singular draw aborts the cell.
        let y = vec![1.0, 2.0, 3.0];
        let xs = vec![vec![1.0, 1.0, 2.0]];
        let mut opts = BootstrapOptions::default().with_seed(3);
        opts.max_singular_ratio = 0.0;
        let err = confidence_interval(&y, &xs, &opts).unwrap_err();
        assert!(matches!(err, RegressError::ExcessiveSingularDraws { .. }));
    }

    #[test]
    fn test_singular_point_fit_fails_before_resampling() {
        let y = vec![1.0, 2.0, 3.0];
        let xs = vec![vec![4.0, 4.0, 4.0]];
        let err = confidence_interval(&y, &xs, &BootstrapOptions::default()).unwrap_err();
        assert_eq!(err, RegressError::Singular);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let dist = BootstrapDistribution {
            values: vec![0.0, 1.0, 2.0, 3.0],
            excluded: 0,
        };
        assert_eq!(dist.percentile(0.0), 0.0);
        assert_eq!(dist.percentile(100.0), 3.0);
        assert!((dist.percentile(50.0) - 1.5).abs() < 1e-12);
        assert!((dist.percentile(2.5) - 0.075).abs() < 1e-12);
        assert!(BootstrapDistribution::default().percentile(50.0).is_nan());
    }
}
