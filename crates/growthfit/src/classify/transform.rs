use serde::{Deserialize, Serialize};
use std::fmt;

/// The five candidate encodings of a `(size, time)` dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// `(ln x, y)`, degree 1
    Logarithmic,
    /// `(x, y / ln y)`, degree 1
    Linearithmic,
    /// `(x, y / ln x)`, degree 1
    LinearithmicAlt,
    /// `(x, y)`, degree 3
    Polynomial,
    /// `(x, ln y)`, degree 1
    Exponential,
}

impl Model {
    /// Every model, in fitting order
    pub const ALL: [Self; 5] = [
        Self::Logarithmic,
        Self::Linearithmic,
        Self::LinearithmicAlt,
        Self::Polynomial,
        Self::Exponential,
    ];

    /// Degree of the polynomial fitted to the transformed points
    #[must_use]
    pub const fn degree(self) -> usize {
        match self {
            Self::Polynomial => 3,
            _ => 1,
        }
    }

    /// Short name used in logs and reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Logarithmic => "logarithmic",
            Self::Linearithmic => "linearithmic",
            Self::LinearithmicAlt => "linearithmic_alt",
            Self::Polynomial => "polynomial",
            Self::Exponential => "exponential",
        }
    }

    /// Transform one pair, or `None` if the pair is invalid for this model
    #[must_use]
    pub fn transform(self, x: f64, y: f64) -> Option<(f64, f64)> {
        let point = match self {
            Self::LinearithmicAlt => {
                if x == 0.0 || y == 0.0 {
                    return None;
                }
                (x, y / x.ln())
            }
            Self::Logarithmic => (x.ln(), y),
            Self::Linearithmic => (x, y / y.ln()),
            Self::Polynomial => (x, y),
            Self::Exponential => (x, y.ln()),
        };
        let (tx, ty) = point;
        if !tx.is_finite() || !ty.is_finite() {
            return None;
        }
        if self != Self::LinearithmicAlt && (tx < 1.0 || ty < 1.0) {
            return None;
        }
        Some(point)
    }

    /// Transformed points that feed the fit
    ///
    /// Pairs are scanned in order and an invalid pair discards everything
    /// collected before it, so only the trailing run of valid pairs remains.
    #[must_use]
    pub fn points(self, xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(xs.len());
        for (&x, &y) in xs.iter().zip(ys) {
            match self.transform(x, y) {
                Some(point) => points.push(point),
                None => points.clear(),
            }
        }
        points
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
