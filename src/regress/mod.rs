//! Ordinary least squares with an explicit intercept.
//!
//! The study only ever needs the fit summary (R-squared and the F test),
//! not the coefficients, so [`fit`] returns a [`RegressionResult`] and
//! nothing else. Singularity is a first-class outcome: a design the solver
//! cannot rank-fully factor is [`RegressError::Singular`], which the
//! bootstrap treats as an excludable draw rather than a failure.

pub mod bootstrap;

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use thiserror::Error;

use crate::models::RegressionResult;

pub use bootstrap::{confidence_interval, BootstrapDistribution, BootstrapOptions, CiReport};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegressError {
    #[error("design matrix is singular or nearly singular")]
    Singular,
    #[error("{got} observations cannot support {needed} parameters")]
    TooFewObservations { needed: usize, got: usize },
    #[error("response has {y} rows but a predictor has {x}")]
    LengthMismatch { y: usize, x: usize },
    #[error("regression inputs must be finite")]
    NonFiniteInput,
    #[error("{excluded} of {attempted} bootstrap draws were singular")]
    ExcessiveSingularDraws { excluded: usize, attempted: usize },
}

pub type RegressResult<T> = Result<T, RegressError>;

/// Fit `y` on the predictor columns `xs` by ordinary least squares.
///
/// An intercept column is always prepended, so `xs` holds only the real
/// predictors. Inputs must be finite; callers drop sentinel rows first.
/// A perfect fit reports `f = inf, p = 0`; degenerate degrees of freedom
/// report NaN for both.
pub fn fit(y: &[f64], xs: &[Vec<f64>]) -> RegressResult<RegressionResult> {
    let n = y.len();
    let p = xs.len() + 1;
    for x in xs {
        if x.len() != n {
            return Err(RegressError::LengthMismatch { y: n, x: x.len() });
        }
    }
    if n < p {
        return Err(RegressError::TooFewObservations { needed: p, got: n });
    }
    if y.iter().any(|v| !v.is_finite()) || xs.iter().any(|x| x.iter().any(|v| !v.is_finite())) {
        return Err(RegressError::NonFiniteInput);
    }

    let design = DMatrix::from_fn(n, p, |r, c| if c == 0 { 1.0 } else { xs[c - 1][r] });
    let response = DVector::from_column_slice(y);

    let svd = design.clone().svd(true, true);
    let tol = f64::EPSILON * svd.singular_values.max() * n.max(p) as f64;
    if svd.rank(tol) < p {
        return Err(RegressError::Singular);
    }
    let beta = svd.solve(&response, tol).map_err(|_| RegressError::Singular)?;

    let fitted = &design * &beta;
    let ss_res: f64 = (&response - &fitted).iter().map(|r| r * r).sum();
    let mean = response.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = response.iter().map(|v| (v - mean) * (v - mean)).sum();
    let r_squared = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    let df_model = p - 1;
    let df_resid = n - p;
    let f_statistic = if df_model == 0 || df_resid == 0 {
        f64::NAN
    } else if r_squared >= 1.0 {
        f64::INFINITY
    } else {
        (r_squared / df_model as f64) / ((1.0 - r_squared) / df_resid as f64)
    };
    let f_pvalue = if f_statistic.is_nan() {
        f64::NAN
    } else if f_statistic.is_infinite() {
        0.0
    } else {
        match FisherSnedecor::new(df_model as f64, df_resid as f64) {
            Ok(dist) => 1.0 - dist.cdf(f_statistic),
            Err(_) => f64::NAN,
        }
    };

    Ok(RegressionResult {
        nobs: n,
        df_model,
        df_resid,
        f_statistic,
        f_pvalue,
        r_squared,
    })
}
