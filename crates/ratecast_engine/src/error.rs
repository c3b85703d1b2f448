//! Error types for forecasting and snapshot handling.
//!
//! Inference-time errors are surfaced to the caller per request; they are
//! never replaced with defaults. Snapshot load failures are fatal — a
//! missing or corrupt artifact never degrades into synthetic output.

use ratecast_core::ConfigurationError;
use ratecast_models::EstimationError;
use thiserror::Error;

/// Errors raised during inference.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The residual covariance failed its PSD check at forecast time.
    ///
    /// Defensive: estimation enforces PSD, so reaching this indicates a
    /// corrupted model object.
    #[error("residual covariance is not positive semi-definite at forecast time")]
    SigmaNotPsd,

    /// No imposed shock value is available for the first horizon.
    #[error("imposed shock path is empty")]
    EmptyShockPath,

    /// The requested horizon is outside the supported range.
    #[error("requested horizon {horizon} outside supported range [1, {max}]")]
    InvalidHorizon {
        /// Requested horizon.
        horizon: usize,
        /// Largest supported horizon.
        max: usize,
    },

    /// The local-projections set has no model for the requested horizon.
    #[error("no fitted local-projections model for horizon {horizon}")]
    HorizonUnavailable {
        /// Requested horizon.
        horizon: usize,
    },

    /// Invalid inference configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A forecast input failed validation.
    #[error("invalid forecast input: {detail}")]
    InvalidInput {
        /// Description of the failure.
        detail: String,
    },
}

impl ForecastError {
    /// Create an invalid-input error.
    pub fn invalid_input(detail: impl Into<String>) -> Self {
        ForecastError::InvalidInput {
            detail: detail.into(),
        }
    }
}

/// Errors raised while serializing or loading a model snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the artifact.
        found: u32,
        /// Version this build writes and reads.
        expected: u32,
    },

    /// A loaded artifact failed its self-check.
    #[error("snapshot integrity check failed: {detail}")]
    IntegrityCheckFailed {
        /// Which check failed.
        detail: String,
    },

    /// The artifact could not be parsed at all.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Rebuilding the model from parts failed.
    #[error(transparent)]
    Estimation(#[from] EstimationError),
}

impl SnapshotError {
    /// Create an integrity-check failure.
    pub fn integrity(detail: impl Into<String>) -> Self {
        SnapshotError::IntegrityCheckFailed {
            detail: detail.into(),
        }
    }
}
