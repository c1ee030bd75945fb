//! Frequency-adjusted use: masked polynomial residuals.
//!
//! A child usage measure is regressed on an adult reference measure with a
//! low-order polynomial; the residual is the part of the child's use the
//! adult baseline does not predict. Rows where the reference is not finite
//! are left out of the fit and carry NaN in the output.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// Polynomial degree of the reference fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyOrder {
    Linear,
    Quadratic,
}

impl PolyOrder {
    pub fn degree(&self) -> usize {
        match self {
            PolyOrder::Linear => 1,
            PolyOrder::Quadratic => 2,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PactError {
    #[error("reference and target lengths differ: {reference} vs {target}")]
    LengthMismatch { reference: usize, target: usize },
    #[error("need {needed} finite reference points for a degree-{degree} fit, found {got}")]
    InsufficientData {
        degree: usize,
        needed: usize,
        got: usize,
    },
    #[error("target value at row {row} is not finite inside the fit mask")]
    NonFiniteTarget { row: usize },
    #[error("reference values provide no variation for a degree-{degree} fit")]
    DegenerateReference { degree: usize },
}

/// Residuals of a masked polynomial fit of `target` on `reference`.
///
/// The mask is `reference.is_finite()`: absent (NaN) and log-of-zero
/// (`-inf`) rows are both excluded. Masked rows get
/// `target - polynomial(reference)`; unmasked rows get NaN, never zero.
/// The whole column fails if fewer than degree+1 points remain, if the
/// masked reference values carry no variation, or if a masked target value
/// is itself non-finite (which would silently poison the fit).
pub fn residualize(
    reference: &[f64],
    target: &[f64],
    order: PolyOrder,
) -> Result<Vec<f64>, PactError> {
    if reference.len() != target.len() {
        return Err(PactError::LengthMismatch {
            reference: reference.len(),
            target: target.len(),
        });
    }
    let degree = order.degree();
    let needed = degree + 1;
    let mask: Vec<usize> = reference
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_finite())
        .map(|(i, _)| i)
        .collect();
    if mask.len() < needed {
        return Err(PactError::InsufficientData {
            degree,
            needed,
            got: mask.len(),
        });
    }
    for &i in &mask {
        if !target[i].is_finite() {
            return Err(PactError::NonFiniteTarget { row: i });
        }
    }

    let m = mask.len();
    let vand = DMatrix::from_fn(m, needed, |r, c| reference[mask[r]].powi(c as i32));
    let y = DVector::from_iterator(m, mask.iter().map(|&i| target[i]));
    let svd = vand.svd(true, true);
    let tol = f64::EPSILON * svd.singular_values.max() * m.max(needed) as f64;
    if svd.rank(tol) < needed {
        return Err(PactError::DegenerateReference { degree });
    }
    let coeffs = svd
        .solve(&y, tol)
        .map_err(|_| PactError::DegenerateReference { degree })?;

    let mut out = vec![f64::NAN; reference.len()];
    for &i in &mask {
        out[i] = target[i] - polyval(&coeffs, reference[i]);
    }
    Ok(out)
}

/// Evaluate `c0 + c1*x + ...` by Horner's rule.
fn polyval(coeffs: &DVector<f64>, x: f64) -> f64 {
    let mut acc = 0.0;
    for i in (0..coeffs.len()).rev() {
        acc = acc * x + coeffs[i];
    }
    acc
}
