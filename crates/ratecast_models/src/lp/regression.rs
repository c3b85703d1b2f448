//! Shrinkage regressions for local projections.
//!
//! Ridge solves its normal equations in closed form through a Cholesky
//! factorization. Lasso and elastic net run cyclic coordinate descent on
//! standardized regressors, then map coefficients back to the original
//! scale. The intercept (column 0 of the design) is never penalized.

use nalgebra::{DMatrix, DVector};
use ratecast_core::math::linalg::solve_spd;
use ratecast_core::ConfigurationError;

use crate::error::EstimationError;

/// Ridge term always added to the ridge normal matrix.
const RIDGE_EPSILON: f64 = 1e-8;

/// Coordinate-descent iteration cap.
const CD_MAX_ITER: usize = 1000;

/// Coordinate-descent convergence tolerance on coefficient updates.
const CD_TOLERANCE: f64 = 1e-8;

/// Shrinkage family for the per-horizon regression.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shrinkage {
    /// L2 penalty with strength `alpha`.
    Ridge {
        /// Penalty strength.
        alpha: f64,
    },
    /// L1 penalty with strength `alpha`.
    Lasso {
        /// Penalty strength.
        alpha: f64,
    },
    /// Mixed penalty: `alpha · (l1_ratio·‖β‖₁ + (1−l1_ratio)/2·‖β‖₂²)`.
    ElasticNet {
        /// Penalty strength.
        alpha: f64,
        /// L1 share of the penalty, in `[0, 1]`.
        l1_ratio: f64,
    },
}

impl Default for Shrinkage {
    fn default() -> Self {
        Shrinkage::Ridge { alpha: 0.1 }
    }
}

impl Shrinkage {
    /// Validates the penalty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] on a negative or non-finite `alpha`,
    /// or an `l1_ratio` outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let alpha = match self {
            Shrinkage::Ridge { alpha }
            | Shrinkage::Lasso { alpha }
            | Shrinkage::ElasticNet { alpha, .. } => *alpha,
        };
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(ConfigurationError::InvalidHyperparameter {
                name: "alpha",
                value: alpha,
                reason: "must be non-negative and finite",
            });
        }
        if let Shrinkage::ElasticNet { l1_ratio, .. } = self {
            if !l1_ratio.is_finite() || !(0.0..=1.0).contains(l1_ratio) {
                return Err(ConfigurationError::InvalidHyperparameter {
                    name: "l1_ratio",
                    value: *l1_ratio,
                    reason: "must lie in [0, 1]",
                });
            }
        }
        Ok(())
    }

    /// Fits the regression `y ~ X` under this penalty.
    ///
    /// Column 0 of `x` must be the intercept column of ones.
    ///
    /// # Errors
    ///
    /// - [`EstimationError::Configuration`] on invalid penalties or empty
    ///   designs
    /// - [`EstimationError::SingularSystem`] if the ridge normal matrix
    ///   fails to factor
    pub fn fit(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<RegressionFit, EstimationError> {
        self.validate()?;
        let n = x.nrows();
        if n == 0 || x.ncols() == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "design",
                detail: "empty design matrix".to_string(),
            }
            .into());
        }
        if y.len() != n {
            return Err(ConfigurationError::ShapeMismatch {
                what: "regression target",
                expected: n,
                got: y.len(),
            }
            .into());
        }

        let coefficients = match *self {
            Shrinkage::Ridge { alpha } => ridge_closed_form(x, y, alpha)?,
            Shrinkage::Lasso { alpha } => coordinate_descent(x, y, alpha, 1.0),
            Shrinkage::ElasticNet { alpha, l1_ratio } => {
                coordinate_descent(x, y, alpha, l1_ratio)
            }
        };

        let fitted = x * &coefficients;
        let ssr: f64 = y
            .iter()
            .zip(fitted.iter())
            .map(|(a, f)| (a - f) * (a - f))
            .sum();
        let y_mean = y.iter().sum::<f64>() / n as f64;
        let sst: f64 = y.iter().map(|v| (v - y_mean) * (v - y_mean)).sum();
        let r_squared = if sst <= f64::MIN_POSITIVE {
            0.0
        } else {
            (1.0 - ssr / sst).clamp(0.0, 1.0)
        };

        Ok(RegressionFit {
            coefficients,
            r_squared,
            ssr,
        })
    }
}

/// A fitted shrinkage regression.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionFit {
    /// Coefficient vector aligned with the design columns (intercept first).
    pub coefficients: DVector<f64>,
    /// In-sample R², clamped to `[0, 1]`.
    pub r_squared: f64,
    /// Residual sum of squares.
    pub ssr: f64,
}

fn ridge_closed_form(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    alpha: f64,
) -> Result<DVector<f64>, EstimationError> {
    let m = x.ncols();
    let mut normal = x.transpose() * x;
    for j in 0..m {
        // Intercept unpenalized; epsilon keeps the factorization alive even
        // at alpha = 0.
        let penalty = if j == 0 { 0.0 } else { alpha };
        normal[(j, j)] += penalty + RIDGE_EPSILON;
    }
    let rhs = x.transpose() * y;
    solve_spd(&normal, &rhs)
        .ok_or_else(|| EstimationError::singular("ridge normal equations".to_string()))
}

/// Cyclic coordinate descent on standardized predictors.
///
/// Minimizes `(1/2n)·‖y − Xβ‖² + α·l1_ratio·‖β‖₁ + (α·(1−l1_ratio)/2)·‖β‖₂²`
/// over the non-intercept columns; the intercept is recovered from the
/// column means afterwards.
fn coordinate_descent(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    alpha: f64,
    l1_ratio: f64,
) -> DVector<f64> {
    let n = x.nrows();
    let m = x.ncols();
    let n_f = n as f64;

    let y_mean = y.iter().sum::<f64>() / n_f;

    // Standardize predictor columns; constant columns are excluded.
    let mut means = vec![0.0; m];
    let mut stds = vec![0.0; m];
    let mut z: Vec<Vec<f64>> = vec![Vec::new(); m];
    for j in 1..m {
        let col = x.column(j);
        let mean = col.iter().sum::<f64>() / n_f;
        let var = col.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n_f;
        let std = var.sqrt();
        means[j] = mean;
        stds[j] = std;
        if std > 1e-12 {
            z[j] = col.iter().map(|v| (v - mean) / std).collect();
        }
    }

    let lambda1 = alpha * l1_ratio;
    let lambda2 = alpha * (1.0 - l1_ratio);

    let mut beta = vec![0.0; m];
    let mut residual: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

    for _ in 0..CD_MAX_ITER {
        let mut max_delta = 0.0f64;
        for j in 1..m {
            if z[j].is_empty() {
                continue;
            }
            // rho = (1/n) Σ z_ij (r_i + z_ij β_j); standardized columns have
            // unit second moment, so the denominator is 1 + lambda2.
            let dot: f64 = z[j].iter().zip(residual.iter()).map(|(a, b)| a * b).sum();
            let rho = dot / n_f + beta[j];
            let updated = soft_threshold(rho, lambda1) / (1.0 + lambda2);
            let delta = updated - beta[j];
            if delta != 0.0 {
                for (r, zij) in residual.iter_mut().zip(z[j].iter()) {
                    *r -= zij * delta;
                }
                beta[j] = updated;
                max_delta = max_delta.max(delta.abs());
            }
        }
        if max_delta < CD_TOLERANCE {
            break;
        }
    }

    // Back to the original scale.
    let mut coefficients = DVector::<f64>::zeros(m);
    let mut intercept = y_mean;
    for j in 1..m {
        if stds[j] > 1e-12 {
            let coef = beta[j] / stds[j];
            coefficients[j] = coef;
            intercept -= coef * means[j];
        }
    }
    coefficients[0] = intercept;
    coefficients
}

#[inline]
fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}
