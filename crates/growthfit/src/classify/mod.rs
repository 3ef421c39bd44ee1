//! Growth-class classification of `(size, time)` datasets
//!
//! The dataset is fitted under five transforms ([`Model`]). Each fit is
//! reduced to a magnitude score (sum of absolute coefficients) and the scores
//! are compared by an ordered list of rules; the first rule that matches
//! names the class. The thresholds are empirical and live in [`thresholds`].
//!
//! ```
//! use growthfit::classify::{classify, ComplexityClass};
//!
//! let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 15.0];
//! let ys = [0.0, 2.0, 12.0, 15.0, 31.0, 74.0, 151.0, 318.0, 637.0, 1329.0, 2646.0, 5490.0];
//! assert_eq!(classify(&xs, &ys).unwrap(), ComplexityClass::Exponential);
//! ```

mod fit;
mod transform;

pub use fit::{polynomial_fit, Fit, MAX_ITERATIONS};
pub use transform::Model;

use crate::result::{GrowthError, GrowthResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Decision thresholds
pub mod thresholds {
    /// Smallest dataset the classifier will label
    pub const MIN_POINTS: usize = 10;
    /// Factor by which one score must undercut another to dominate it
    pub const DOMINANCE: f64 = 10.0;
    /// The strict logarithmic rule only applies below this score
    pub const LOG_SCORE_CEILING: f64 = 100.0;
    /// Multiplier applied to the alternate linearithmic score before reconciling
    pub const ALT_LINEARITHMIC_PENALTY: f64 = 10.0;
    /// Exponential growth is only credible when every size is below this
    pub const EXP_MAX_SIZE: f64 = 100.0;
    /// Polynomial coefficients at or below this count as zero
    pub const EPSILON: f64 = 1e-15;
}

/// Asymptotic growth class of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplexityClass {
    /// Not enough data to decide
    #[serde(rename = "")]
    Undetermined,
    /// `log(n)`
    #[serde(rename = "log(n)")]
    Logarithmic,
    /// `n*log(n)`
    #[serde(rename = "n*log(n)")]
    Linearithmic,
    /// `n`
    #[serde(rename = "n")]
    Linear,
    /// `n^2`
    #[serde(rename = "n^2")]
    Quadratic,
    /// `n^3`
    #[serde(rename = "n^3")]
    Cubic,
    /// Polynomial of no recognizable degree
    #[serde(rename = "n^?")]
    Polynomial,
    /// `2^n`
    #[serde(rename = "2^n")]
    Exponential,
}

impl ComplexityClass {
    /// The canonical label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Undetermined => "",
            Self::Logarithmic => "log(n)",
            Self::Linearithmic => "n*log(n)",
            Self::Linear => "n",
            Self::Quadratic => "n^2",
            Self::Cubic => "n^3",
            Self::Polynomial => "n^?",
            Self::Exponential => "2^n",
        }
    }

    /// Whether a class was decided
    #[must_use]
    pub const fn is_determined(self) -> bool {
        !matches!(self, Self::Undetermined)
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One model's fit and score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelFit {
    /// Which transform
    pub model: Model,
    /// Points that survived the transform
    pub points: usize,
    /// Fitted coefficients
    pub fit: Fit,
    /// Sum of absolute coefficients
    pub score: f64,
    /// Sum of squared residuals over the surviving points; `None` if diverged
    pub residual: Option<f64>,
}

/// Full breakdown of one classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Chosen class
    pub label: ComplexityClass,
    /// Points in the input dataset
    pub points: usize,
    /// Per-model fits in [`Model::ALL`] order; empty when undetermined
    pub fits: Vec<ModelFit>,
    /// Linearithmic score after reconciling with the alternate form
    pub linearithmic_score: Option<f64>,
}

impl Classification {
    fn undetermined(points: usize) -> Self {
        Self {
            label: ComplexityClass::Undetermined,
            points,
            fits: Vec::new(),
            linearithmic_score: None,
        }
    }

    /// Fit for one model, if the models were fitted
    #[must_use]
    pub fn fit(&self, model: Model) -> Option<&ModelFit> {
        self.fits.iter().find(|f| f.model == model)
    }

    fn score(&self, model: Model) -> f64 {
        self.fit(model).map_or(f64::INFINITY, |f| f.score)
    }
}

/// Classify a dataset; `xs` are sizes and `ys` the matching times
///
/// # Errors
///
/// Returns [`GrowthError::LengthMismatch`] if the slices differ in length.
pub fn classify(xs: &[f64], ys: &[f64]) -> GrowthResult<ComplexityClass> {
    analyze(xs, ys).map(|c| c.label)
}

/// Classify a dataset and keep every model's fit
///
/// # Errors
///
/// Returns [`GrowthError::LengthMismatch`] if the slices differ in length.
pub fn analyze(xs: &[f64], ys: &[f64]) -> GrowthResult<Classification> {
    if xs.len() != ys.len() {
        return Err(GrowthError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    if xs.len() < thresholds::MIN_POINTS {
        let reason = GrowthError::InsufficientData {
            points: xs.len(),
            required: thresholds::MIN_POINTS,
        };
        debug!(%reason, "classification skipped");
        return Ok(Classification::undetermined(xs.len()));
    }

    let fits: Vec<ModelFit> = Model::ALL
        .iter()
        .map(|&model| fit_model(model, xs, ys))
        .collect();

    let mut classification = Classification {
        label: ComplexityClass::Undetermined,
        points: xs.len(),
        fits,
        linearithmic_score: None,
    };

    let linearithmic = classification.score(Model::Linearithmic).min(
        classification.score(Model::LinearithmicAlt) * thresholds::ALT_LINEARITHMIC_PENALTY,
    );
    let max_size = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scores = Scores {
        log: classification.score(Model::Logarithmic),
        linearithmic,
        poly: classification.score(Model::Polynomial),
        exp: classification.score(Model::Exponential),
    };
    let poly = classification
        .fit(Model::Polynomial)
        .map(|f| f.fit.clone())
        .unwrap_or(Fit::Diverged);

    classification.label = decide(&scores, &poly, max_size);
    classification.linearithmic_score = Some(linearithmic);
    debug!(
        label = %classification.label,
        log = scores.log,
        linearithmic = scores.linearithmic,
        poly = scores.poly,
        exp = scores.exp,
        "classified"
    );
    Ok(classification)
}

fn fit_model(model: Model, xs: &[f64], ys: &[f64]) -> ModelFit {
    let points = model.points(xs, ys);
    let fit = polynomial_fit(&points, model.degree());
    let residual = if fit.is_diverged() {
        let reason = GrowthError::FitDivergence {
            model: model.name().to_string(),
        };
        debug!(%reason, points = points.len(), "model discarded");
        None
    } else {
        let residual = fit.residual_sum_of_squares(&points);
        debug!(
            %model,
            points = points.len(),
            coefficients = ?fit.coefficients(),
            residual,
            "model fitted"
        );
        Some(residual)
    };
    ModelFit {
        model,
        points: points.len(),
        score: fit.magnitude(),
        fit,
        residual,
    }
}

#[derive(Clone, Copy)]
struct Scores {
    log: f64,
    linearithmic: f64,
    poly: f64,
    exp: f64,
}

fn decide(scores: &Scores, poly: &Fit, max_size: f64) -> ComplexityClass {
    use thresholds::{DOMINANCE, EPSILON, EXP_MAX_SIZE, LOG_SCORE_CEILING};
    let Scores {
        log,
        linearithmic,
        poly: poly_score,
        exp,
    } = *scores;

    let log_loose = log < DOMINANCE * linearithmic && log < DOMINANCE * poly_score;
    let log_strict = DOMINANCE * log < linearithmic
        && DOMINANCE * log < poly_score
        && log < LOG_SCORE_CEILING;
    if log_loose || log_strict {
        return ComplexityClass::Logarithmic;
    }

    // 2^100 dwarfs any measurable time
    if exp < poly_score && exp * DOMINANCE < linearithmic && max_size < EXP_MAX_SIZE {
        return ComplexityClass::Exponential;
    }

    if linearithmic < poly_score {
        return ComplexityClass::Linearithmic;
    }

    let (Some(c2), Some(c3)) = (poly.coefficient(2), poly.coefficient(3)) else {
        return ComplexityClass::Polynomial;
    };
    if c2 < EPSILON && c3 < EPSILON {
        ComplexityClass::Linear
    } else if c2 > EPSILON && c3 < EPSILON {
        ComplexityClass::Quadratic
    } else if c3 > EPSILON {
        ComplexityClass::Cubic
    } else {
        ComplexityClass::Polynomial
    }
}
