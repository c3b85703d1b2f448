//! Estimation error types.
//!
//! Estimation-time failures abort the whole fit; they are never converted
//! into advisories or papered over with defaults. Per-horizon local
//! projection failures are the one isolated case — those surface as skipped
//! horizons on the fit outcome instead.

use ratecast_core::{AlignmentError, ConfigurationError};
use thiserror::Error;

/// Errors raised while fitting either estimator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    /// Invalid hyperparameters or input shapes.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The aligned sample could not support the requested design.
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    /// Too few observations for the requested lag order.
    #[error("insufficient data: {provided} observations, at least {required} required")]
    InsufficientData {
        /// Minimum observations required.
        required: usize,
        /// Observations provided.
        provided: usize,
    },

    /// A linear system that should be positive definite failed to factor.
    #[error("singular system during estimation: {detail}")]
    SingularSystem {
        /// Description of the failing system.
        detail: String,
    },

    /// The residual covariance stayed outside the PSD cone after repair.
    #[error("residual covariance is not positive semi-definite after repair")]
    CovarianceNotPsd,

    /// NaN, Inf, or a degenerate quantity stopped the computation.
    #[error("numerical instability: {detail}")]
    NumericalInstability {
        /// Description of the numerical issue.
        detail: String,
    },
}

impl EstimationError {
    /// Create a singular-system error.
    pub fn singular(detail: impl Into<String>) -> Self {
        EstimationError::SingularSystem {
            detail: detail.into(),
        }
    }

    /// Create a numerical-instability error.
    pub fn instability(detail: impl Into<String>) -> Self {
        EstimationError::NumericalInstability {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_counts() {
        let err = EstimationError::InsufficientData {
            required: 8,
            provided: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains('8'));
        assert!(msg.contains('4'));
    }

    #[test]
    fn test_configuration_error_converts() {
        let inner = ConfigurationError::ShapeMismatch {
            what: "scale",
            expected: 2,
            got: 1,
        };
        let err: EstimationError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }
}
