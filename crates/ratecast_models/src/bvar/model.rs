//! Fit entry point and the immutable fitted BVAR.
//!
//! `FittedBvar::fit` is a pure function of (configuration, aligned data):
//! it builds the prior, runs the posterior update, diagnoses stability, and
//! caches the structural IRF set. The result is an immutable snapshot —
//! training mutated nothing shared, and the fitted value is safe to share
//! across concurrent inference calls without locking.

use chrono::NaiveDate;
use ratecast_core::{
    Advisory, AlignedSeries, ConfigurationError, Outcome, ScaleInfo, N_VARS,
};

use super::irf::{StructuralIrfCalculator, StructuralIrfSet};
use super::posterior::{estimate, PosteriorEstimate};
use super::prior::{MinnesotaPrior, PriorSpecification};
use super::stability::{StabilityChecker, StabilityVerdict};
use crate::error::EstimationError;

/// Extra observations beyond the lag order below which the sample is
/// flagged as thin.
const COMFORT_MARGIN: usize = 5;

/// BVAR fit configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvarConfig {
    /// Minnesota prior hyperparameters.
    pub prior: PriorSpecification,
    /// VAR lag order.
    pub lag_order: usize,
    /// Largest IRF horizon to cache.
    pub irf_horizon: usize,
}

impl Default for BvarConfig {
    fn default() -> Self {
        Self {
            prior: PriorSpecification::default(),
            lag_order: 3,
            irf_horizon: 12,
        }
    }
}

impl BvarConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] on a zero lag order, an excessive lag
    /// order, a zero IRF horizon, or invalid prior hyperparameters.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.prior.validate()?;
        if self.lag_order == 0 || self.lag_order > 12 {
            return Err(ConfigurationError::InvalidParameter {
                name: "lag_order",
                detail: format!("{} outside supported range [1, 12]", self.lag_order),
            });
        }
        if self.irf_horizon == 0 {
            return Err(ConfigurationError::InvalidParameter {
                name: "irf_horizon",
                detail: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// An immutable fitted BVAR: posterior, diagnostics, and cached IRFs.
///
/// All accessors take `&self`; nothing about a fitted model changes after
/// `fit` returns. Forecasting state (the Monte-Carlo recursion) lives in
/// the engine layer, which seeds the recursion from
/// [`recent_observations`](Self::recent_observations).
#[derive(Debug, Clone, PartialEq)]
pub struct FittedBvar {
    config: BvarConfig,
    posterior: PosteriorEstimate,
    verdict: StabilityVerdict,
    irf: StructuralIrfSet,
    scale: ScaleInfo,
    train_range: (NaiveDate, NaiveDate),
    data_fingerprint: u64,
    recent_observations: Vec<[f64; N_VARS]>,
}

impl FittedBvar {
    /// Fits the BVAR on an aligned series.
    ///
    /// Returns `Outcome::Warning` with advisories for a thin sample or a
    /// non-stationary companion matrix; both leave the model fully usable.
    ///
    /// # Errors
    ///
    /// - [`EstimationError::Configuration`] on invalid configuration
    /// - [`EstimationError::InsufficientData`] when fewer than
    ///   `lag_order + 2` observations are available
    /// - estimation failures propagated from the posterior update and IRF
    ///   factorization
    pub fn fit(
        config: BvarConfig,
        series: &AlignedSeries,
    ) -> Result<Outcome<FittedBvar>, EstimationError> {
        config.validate()?;

        let p = config.lag_order;
        let n = series.len();
        if n < p + 2 {
            return Err(EstimationError::InsufficientData {
                required: p + 2,
                provided: n,
            });
        }

        let mut advisories = Vec::new();
        if n < p + COMFORT_MARGIN {
            advisories.push(Advisory::InsufficientSample {
                n_obs: n,
                required: p + COMFORT_MARGIN,
            });
        }

        let scale = ScaleInfo::from_series(series);
        let prior = MinnesotaPrior::build(
            &config.prior,
            p,
            &[scale.shock_variance, scale.response_variance],
        )?;

        let (x, y) = series.design_matrices(p)?;
        let posterior = estimate(&prior, &x, &y)?;

        let verdict = StabilityChecker::check(&posterior);
        if !verdict.stable {
            advisories.push(Advisory::Unstable {
                max_modulus: verdict.max_modulus,
            });
        }

        let irf = StructuralIrfCalculator::compute(&posterior, config.irf_horizon)?;

        let recent_observations = (n - p..n).map(|t| series.observation(t)).collect();

        let fitted = FittedBvar {
            config,
            posterior,
            verdict,
            irf,
            scale,
            train_range: series.date_range(),
            data_fingerprint: series.fingerprint(),
            recent_observations,
        };
        Ok(Outcome::new(fitted, advisories))
    }

    /// Reassembles a fitted model from persisted parts (snapshot load).
    ///
    /// The stability verdict and IRF set are recomputed from Beta/Sigma
    /// rather than trusted from storage.
    ///
    /// # Errors
    ///
    /// Shape or factorization failures surface as [`EstimationError`];
    /// callers add their own integrity checks on top.
    pub fn from_parts(
        config: BvarConfig,
        posterior: PosteriorEstimate,
        scale: ScaleInfo,
        train_range: (NaiveDate, NaiveDate),
        data_fingerprint: u64,
        recent_observations: Vec<[f64; N_VARS]>,
    ) -> Result<FittedBvar, EstimationError> {
        config.validate()?;
        if recent_observations.len() != config.lag_order {
            return Err(ConfigurationError::ShapeMismatch {
                what: "recent observations",
                expected: config.lag_order,
                got: recent_observations.len(),
            }
            .into());
        }
        let verdict = StabilityChecker::check(&posterior);
        let irf = StructuralIrfCalculator::compute(&posterior, config.irf_horizon)?;
        Ok(FittedBvar {
            config,
            posterior,
            verdict,
            irf,
            scale,
            train_range,
            data_fingerprint,
            recent_observations,
        })
    }

    /// Fit configuration.
    #[inline]
    pub fn config(&self) -> &BvarConfig {
        &self.config
    }

    /// Posterior estimate (Beta, Sigma, diagnostics).
    #[inline]
    pub fn posterior(&self) -> &PosteriorEstimate {
        &self.posterior
    }

    /// Stability verdict.
    #[inline]
    pub fn verdict(&self) -> StabilityVerdict {
        self.verdict
    }

    /// Cached structural IRF set.
    #[inline]
    pub fn irf(&self) -> &StructuralIrfSet {
        &self.irf
    }

    /// Empirical variance scale captured at fit time.
    #[inline]
    pub fn scale(&self) -> ScaleInfo {
        self.scale
    }

    /// First and last training month.
    #[inline]
    pub fn train_range(&self) -> (NaiveDate, NaiveDate) {
        self.train_range
    }

    /// FNV-1a fingerprint of the training data.
    #[inline]
    pub fn data_fingerprint(&self) -> u64 {
        self.data_fingerprint
    }

    /// The last `lag_order` observations, oldest first — the initial lag
    /// state for conditional forecasting.
    #[inline]
    pub fn recent_observations(&self) -> &[[f64; N_VARS]] {
        &self.recent_observations
    }

    /// In-sample R² of the response equation.
    #[inline]
    pub fn response_r_squared(&self) -> f64 {
        self.posterior.r_squared()[1]
    }
}
