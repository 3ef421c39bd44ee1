//! Ordinary least-squares polynomial fits
//!
//! Sizes span up to nine decimal orders of magnitude, so the abscissa is
//! rescaled to `[-1, 1]` before the Vandermonde matrix is built and the
//! coefficients are mapped back afterwards. The system is solved through an
//! SVD whose iteration count is capped; a solve that does not converge is a
//! [`Fit::Diverged`].

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Iteration cap handed to the SVD
pub const MAX_ITERATIONS: usize = 10_000;

/// Coefficients of one fitted polynomial, lowest order first, or a failed fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fit {
    /// `[c0, c1, ..]` for `y = c0 + c1·x + ..`
    Coefficients(Vec<f64>),
    /// The solver gave no usable answer
    Diverged,
}

impl Fit {
    /// Sum of absolute coefficient values; infinite for a diverged fit
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        match self {
            Self::Coefficients(c) => c.iter().map(|v| v.abs()).sum(),
            Self::Diverged => f64::INFINITY,
        }
    }

    /// Coefficient of `x^power`, if fitted
    #[must_use]
    pub fn coefficient(&self, power: usize) -> Option<f64> {
        match self {
            Self::Coefficients(c) => c.get(power).copied(),
            Self::Diverged => None,
        }
    }

    /// All coefficients; empty for a diverged fit
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        match self {
            Self::Coefficients(c) => c,
            Self::Diverged => &[],
        }
    }

    /// Whether the fit failed
    #[must_use]
    pub const fn is_diverged(&self) -> bool {
        matches!(self, Self::Diverged)
    }

    /// Evaluate the polynomial at `x`
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        match self {
            Self::Coefficients(c) => c.iter().rev().fold(0.0, |acc, coef| acc * x + coef),
            Self::Diverged => f64::NAN,
        }
    }

    /// Sum of squared residuals over `points`
    #[must_use]
    pub fn residual_sum_of_squares(&self, points: &[(f64, f64)]) -> f64 {
        points
            .iter()
            .map(|&(x, y)| (self.predict(x) - y).powi(2))
            .sum()
    }
}

/// Fit `y = c0 + c1·x + .. + c_degree·x^degree` by least squares
///
/// Fewer points than coefficients, a non-converging SVD or non-finite
/// coefficients all give [`Fit::Diverged`].
#[must_use]
pub fn polynomial_fit(points: &[(f64, f64)], degree: usize) -> Fit {
    let terms = degree + 1;
    if points.len() < terms
        || points
            .iter()
            .any(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Fit::Diverged;
    }

    let scale = points.iter().map(|(x, _)| x.abs()).fold(0.0_f64, f64::max);
    let scale = if scale > 0.0 { scale } else { 1.0 };

    let design = DMatrix::from_fn(points.len(), terms, |row, col| {
        (points[row].0 / scale).powi(col as i32)
    });
    let target = DVector::from_iterator(points.len(), points.iter().map(|(_, y)| *y));

    let Some(svd) = design.try_svd(true, true, f64::EPSILON, MAX_ITERATIONS) else {
        return Fit::Diverged;
    };
    let cutoff = svd.singular_values.max() * f64::EPSILON * points.len() as f64;
    let Ok(solution) = svd.solve(&target, cutoff) else {
        return Fit::Diverged;
    };

    let coefficients: Vec<f64> = solution
        .iter()
        .enumerate()
        .map(|(power, b)| b / scale.powi(power as i32))
        .collect();

    if coefficients.iter().all(|c| c.is_finite()) {
        Fit::Coefficients(coefficients)
    } else {
        Fit::Diverged
    }
}
