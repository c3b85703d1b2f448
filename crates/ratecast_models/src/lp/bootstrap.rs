//! Row-resampling bootstrap confidence intervals.
//!
//! The bootstrap is the sole source of local-projections uncertainty: rows
//! of the horizon design are resampled with replacement, the regression is
//! refit per resample with the horizon's chosen lag order, and the 2.5th
//! and 97.5th percentiles of the resampled shock coefficients form the
//! interval. No parametric assumption enters.
//!
//! Each resample owns an RNG seeded deterministically from the base seed
//! and its resample index, so results are bit-identical for a fixed seed
//! regardless of how the resample loop is scheduled across threads.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use ratecast_core::math::stats::percentile;
use ratecast_core::{AlignedSeries, ConfigurationError};

use super::estimator::horizon_design;
use super::regression::Shrinkage;
use crate::error::EstimationError;

/// Minimum successful refits for a usable interval.
const MIN_SUCCESSFUL_RESAMPLES: usize = 10;

/// Bootstrap configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BootstrapConfig {
    /// Number of resamples.
    pub n_resamples: usize,
    /// Base seed; per-resample seeds derive from it.
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_resamples: 1000,
            seed: 7,
        }
    }
}

impl BootstrapConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when fewer resamples are requested
    /// than can support a percentile interval.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.n_resamples < MIN_SUCCESSFUL_RESAMPLES {
            return Err(ConfigurationError::InvalidParameter {
                name: "n_resamples",
                detail: format!(
                    "{} resamples cannot support a percentile interval (minimum {})",
                    self.n_resamples, MIN_SUCCESSFUL_RESAMPLES
                ),
            });
        }
        Ok(())
    }
}

/// Computes bootstrap percentile intervals for horizon shock coefficients.
#[derive(Debug, Clone, Copy, Default)]
pub struct BootstrapCi;

impl BootstrapCi {
    /// 95% percentile interval for the shock coefficient at `horizon`.
    ///
    /// # Errors
    ///
    /// - [`EstimationError::InsufficientData`] when the horizon design has
    ///   no rows
    /// - [`EstimationError::NumericalInstability`] when too few resamples
    ///   produced a fit
    pub fn confidence_interval(
        series: &AlignedSeries,
        horizon: usize,
        lag_order: usize,
        shrinkage: &Shrinkage,
        config: &BootstrapConfig,
    ) -> Result<(f64, f64), EstimationError> {
        config.validate()?;
        let (x, y) =
            horizon_design(series, horizon, lag_order).ok_or(EstimationError::InsufficientData {
                required: horizon + lag_order + 1,
                provided: series.len(),
            })?;

        let indices: Vec<u64> = (0..config.n_resamples as u64).collect();

        #[cfg(feature = "parallel")]
        let coefficients: Vec<f64> = indices
            .par_iter()
            .filter_map(|&b| refit_resample(&x, &y, shrinkage, derive_seed(config.seed, b)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let coefficients: Vec<f64> = indices
            .iter()
            .filter_map(|&b| refit_resample(&x, &y, shrinkage, derive_seed(config.seed, b)))
            .collect();

        if coefficients.len() < MIN_SUCCESSFUL_RESAMPLES {
            return Err(EstimationError::instability(format!(
                "only {} of {} bootstrap resamples produced a fit",
                coefficients.len(),
                config.n_resamples
            )));
        }

        Ok((
            percentile(&coefficients, 2.5),
            percentile(&coefficients, 97.5),
        ))
    }
}

/// Refits one resample; `None` when the resampled design fails to fit.
fn refit_resample(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    shrinkage: &Shrinkage,
    seed: u64,
) -> Option<f64> {
    let rows = x.nrows();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut xb = DMatrix::<f64>::zeros(rows, x.ncols());
    let mut yb = DVector::<f64>::zeros(rows);
    for row in 0..rows {
        let pick = rng.gen_range(0..rows);
        xb.row_mut(row).copy_from(&x.row(pick));
        yb[row] = y[pick];
    }

    shrinkage
        .fit(&xb, &yb)
        .ok()
        .map(|fit| fit.coefficients[1])
}

/// SplitMix64 step over the base seed and resample index.
fn derive_seed(base: u64, index: u64) -> u64 {
    let mut z = base
        .wrapping_add(index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
