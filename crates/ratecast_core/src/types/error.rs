//! Error types for configuration and data alignment.
//!
//! This module provides:
//! - `ConfigurationError`: invalid hyperparameters or shape mismatches,
//!   always fatal to the operation that received them
//! - `AlignmentError`: failures while aligning event-driven series onto the
//!   monthly grid or assembling lagged design matrices

use thiserror::Error;

/// Configuration errors.
///
/// Raised when hyperparameters or input shapes fail validation. These are
/// always fatal: a fit aborts immediately rather than proceeding with a
/// misconfigured model.
///
/// # Examples
/// ```
/// use ratecast_core::ConfigurationError;
///
/// let err = ConfigurationError::ShapeMismatch {
///     what: "scale variances",
///     expected: 2,
///     got: 3,
/// };
/// assert!(err.to_string().contains("scale variances"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// A shrinkage or decay hyperparameter is outside its valid range.
    #[error("invalid hyperparameter '{name}' = {value}: {reason}")]
    InvalidHyperparameter {
        /// Hyperparameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// An input's dimensions do not match what the component expects.
    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// What was being validated.
        what: &'static str,
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        got: usize,
    },

    /// A parameter failed validation for a reason carried in the message.
    #[error("invalid parameter '{name}': {detail}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the failure.
        detail: String,
    },
}

/// Data alignment errors.
///
/// Raised while building the common monthly grid from two event-driven
/// series, or while assembling lagged design matrices from the result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// An input series contains no observations.
    #[error("series '{name}' is empty")]
    EmptySeries {
        /// Which series was empty.
        name: &'static str,
    },

    /// An input series is not strictly increasing in date.
    #[error("series '{name}' has a duplicate or out-of-order date at index {index}")]
    UnorderedDates {
        /// Which series was unordered.
        name: &'static str,
        /// Index of the offending observation.
        index: usize,
    },

    /// The two series share no overlapping months.
    #[error("no monthly overlap between shock and response series")]
    NoOverlap,

    /// The aligned sample is too short to support the requested operation.
    #[error("aligned sample too small: {provided} rows, need at least {required}")]
    SampleTooSmall {
        /// Minimum rows required.
        required: usize,
        /// Rows actually available.
        provided: usize,
    },

    /// The aligned series violated a construction invariant.
    #[error("aligned series invariant violated: {detail}")]
    InvariantViolated {
        /// Description of the violation.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = ConfigurationError::InvalidHyperparameter {
            name: "lambda1",
            value: -0.2,
            reason: "must be positive",
        };
        let msg = err.to_string();
        assert!(msg.contains("lambda1"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_alignment_error_display() {
        let err = AlignmentError::SampleTooSmall {
            required: 8,
            provided: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('8'));
        assert!(msg.contains('3'));

        let err = AlignmentError::NoOverlap;
        assert!(err.to_string().contains("overlap"));
    }
}
