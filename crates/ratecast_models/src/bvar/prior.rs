//! Minnesota prior construction.
//!
//! The Minnesota prior shrinks VAR coefficients toward zero, with higher
//! lags and cross-variable effects shrunk harder than own-lag effects.
//! Variances are scaled by the ratio of empirical move variances so that
//! equations measured in different units sit on a comparable footing.

use nalgebra::DMatrix;
use ratecast_core::{ConfigurationError, N_VARS};

use crate::error::EstimationError;

/// Shrinkage hyperparameters for the Minnesota prior.
///
/// Immutable per model instance; validated at construction of the prior.
///
/// - `lambda1` — overall tightness of the coefficient prior
/// - `lambda2` — additional shrinkage on cross-variable coefficients
/// - `lambda3` — lag-decay exponent (variance shrinks as `1/ℓ^λ3`)
/// - `lambda4` — looseness multiplier on the intercept
/// - `intercept_mean` — prior mean of the intercept (all other coefficient
///   means are zero)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorSpecification {
    /// Overall tightness.
    pub lambda1: f64,
    /// Cross-variable shrinkage factor.
    pub lambda2: f64,
    /// Lag-decay exponent.
    pub lambda3: f64,
    /// Intercept looseness multiplier.
    pub lambda4: f64,
    /// Prior mean of the intercept.
    pub intercept_mean: f64,
}

impl Default for PriorSpecification {
    fn default() -> Self {
        Self {
            lambda1: 0.2,
            lambda2: 0.5,
            lambda3: 1.0,
            lambda4: 100.0,
            intercept_mean: 0.0,
        }
    }
}

impl PriorSpecification {
    /// Validates the hyperparameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidHyperparameter`] when any λ is
    /// non-positive or non-finite, or when the intercept mean is non-finite.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let checks = [
            ("lambda1", self.lambda1),
            ("lambda2", self.lambda2),
            ("lambda3", self.lambda3),
            ("lambda4", self.lambda4),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigurationError::InvalidHyperparameter {
                    name,
                    value,
                    reason: "must be positive and finite",
                });
            }
        }
        if !self.intercept_mean.is_finite() {
            return Err(ConfigurationError::InvalidHyperparameter {
                name: "intercept_mean",
                value: self.intercept_mean,
                reason: "must be finite",
            });
        }
        Ok(())
    }
}

/// Prior mean and variance for every VAR coefficient.
///
/// Row `i` covers equation `i`; columns follow the design layout
/// `[intercept, lag 1 (all variables), lag 2, ...]`, so both matrices are
/// `N_VARS x (1 + N_VARS * p)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinnesotaPrior {
    mean: DMatrix<f64>,
    variance: DMatrix<f64>,
    lag_order: usize,
}

impl MinnesotaPrior {
    /// Builds the prior for lag order `p` from empirical move variances.
    ///
    /// `scale` holds one variance per variable in system order (shock
    /// first). Variance of coefficient (equation `i`, lag `ℓ`, variable `j`)
    /// is `(λ1²/ℓ^λ3) · (var_i/var_j) · (λ2² if i≠j else 1)`; the intercept
    /// variance is `(λ4·σ_i)²` and its mean is the configured intercept
    /// mean.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError`] via [`PriorSpecification::validate`]
    /// - [`ConfigurationError::ShapeMismatch`] when `scale` does not carry
    ///   exactly [`N_VARS`] variances
    /// - [`ConfigurationError::InvalidParameter`] when `p` is zero or a
    ///   scale variance is not positive
    pub fn build(
        spec: &PriorSpecification,
        p: usize,
        scale: &[f64],
    ) -> Result<Self, EstimationError> {
        spec.validate()?;
        if scale.len() != N_VARS {
            return Err(ConfigurationError::ShapeMismatch {
                what: "scale variances",
                expected: N_VARS,
                got: scale.len(),
            }
            .into());
        }
        if p == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "lag_order",
                detail: "must be at least 1".to_string(),
            }
            .into());
        }
        if scale.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigurationError::InvalidParameter {
                name: "scale variances",
                detail: "must be positive and finite".to_string(),
            }
            .into());
        }

        let m = 1 + N_VARS * p;
        let mut mean = DMatrix::<f64>::zeros(N_VARS, m);
        let mut variance = DMatrix::<f64>::zeros(N_VARS, m);

        for i in 0..N_VARS {
            mean[(i, 0)] = spec.intercept_mean;
            let sigma_i = scale[i].sqrt();
            variance[(i, 0)] = (spec.lambda4 * sigma_i).powi(2);

            for lag in 1..=p {
                let decay = spec.lambda1.powi(2) / (lag as f64).powf(spec.lambda3);
                for j in 0..N_VARS {
                    let cross = if i == j { 1.0 } else { spec.lambda2.powi(2) };
                    let ratio = scale[i] / scale[j];
                    let col = 1 + (lag - 1) * N_VARS + j;
                    variance[(i, col)] = decay * ratio * cross;
                }
            }
        }

        Ok(Self {
            mean,
            variance,
            lag_order: p,
        })
    }

    /// Prior mean matrix (`N_VARS x (1 + N_VARS·p)`).
    #[inline]
    pub fn mean(&self) -> &DMatrix<f64> {
        &self.mean
    }

    /// Prior variance matrix (`N_VARS x (1 + N_VARS·p)`).
    #[inline]
    pub fn variance(&self) -> &DMatrix<f64> {
        &self.variance
    }

    /// Lag order the prior was built for.
    #[inline]
    pub fn lag_order(&self) -> usize {
        self.lag_order
    }

    /// Number of coefficients per equation.
    #[inline]
    pub fn n_coefficients(&self) -> usize {
        self.mean.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_spec_is_valid() {
        assert!(PriorSpecification::default().validate().is_ok());
    }

    #[test]
    fn test_negative_lambda_rejected() {
        let spec = PriorSpecification {
            lambda1: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            spec.validate(),
            Err(ConfigurationError::InvalidHyperparameter { name: "lambda1", .. })
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let spec = PriorSpecification::default();
        let result = MinnesotaPrior::build(&spec, 2, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(EstimationError::Configuration(
                ConfigurationError::ShapeMismatch { .. }
            ))
        ));
    }

    #[test]
    fn test_zero_lag_order_rejected() {
        let spec = PriorSpecification::default();
        let result = MinnesotaPrior::build(&spec, 0, &[1.0, 1.0]);
        assert!(result.is_err());
    }

    #[test]
    fn test_variance_formula() {
        let spec = PriorSpecification {
            lambda1: 0.2,
            lambda2: 0.5,
            lambda3: 1.0,
            lambda4: 10.0,
            intercept_mean: 0.0,
        };
        let scale = [4.0, 1.0];
        let prior = MinnesotaPrior::build(&spec, 2, &scale).unwrap();

        // Equation 0, lag 1, own variable: lambda1^2 * (var_0/var_0).
        assert_relative_eq!(prior.variance()[(0, 1)], 0.04, epsilon = 1e-12);
        // Equation 0, lag 1, cross variable: lambda1^2 * (var_0/var_1) * lambda2^2.
        assert_relative_eq!(prior.variance()[(0, 2)], 0.04 * 4.0 * 0.25, epsilon = 1e-12);
        // Equation 1, lag 2, own variable: lambda1^2 / 2 * (var_1/var_1).
        assert_relative_eq!(prior.variance()[(1, 4)], 0.02, epsilon = 1e-12);
        // Intercepts: (lambda4 * sigma_i)^2.
        assert_relative_eq!(prior.variance()[(0, 0)], (10.0_f64 * 2.0).powi(2), epsilon = 1e-9);
        assert_relative_eq!(prior.variance()[(1, 0)], (10.0_f64 * 1.0).powi(2), epsilon = 1e-9);
    }

    #[test]
    fn test_higher_lags_shrink_harder() {
        let prior =
            MinnesotaPrior::build(&PriorSpecification::default(), 3, &[1.0, 1.0]).unwrap();
        // Own-lag variances decay with lag for each equation.
        assert!(prior.variance()[(0, 1)] > prior.variance()[(0, 3)]);
        assert!(prior.variance()[(0, 3)] > prior.variance()[(0, 5)]);
    }

    #[test]
    fn test_mean_zero_except_intercept() {
        let spec = PriorSpecification {
            intercept_mean: 0.5,
            ..Default::default()
        };
        let prior = MinnesotaPrior::build(&spec, 2, &[1.0, 1.0]).unwrap();
        assert_eq!(prior.mean()[(0, 0)], 0.5);
        assert_eq!(prior.mean()[(1, 0)], 0.5);
        for col in 1..prior.n_coefficients() {
            assert_eq!(prior.mean()[(0, col)], 0.0);
            assert_eq!(prior.mean()[(1, col)], 0.0);
        }
    }
}
