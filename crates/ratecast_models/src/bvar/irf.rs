//! Cholesky-identified structural impulse responses.
//!
//! Identification uses the lower-triangular factor of the residual
//! covariance under a fixed causal ordering that places the shock variable
//! first. The ordering is a documented modeling assumption, not something
//! derived from the data. The factor is rescaled so the impact response of
//! the shock variable is exactly one ("unit shock"), and dynamics propagate
//! through powers of the companion matrix:
//!
//! ```text
//! IRF(0) = L,    IRF(h) = (Fʰ)[0..k, 0..k] · L
//! ```

use nalgebra::DMatrix;
use ratecast_core::math::linalg::{project_psd, safe_cholesky};
use ratecast_core::N_VARS;

use super::posterior::PosteriorEstimate;
use super::stability::StabilityChecker;
use crate::error::EstimationError;

/// Jitter added before Cholesky factorization.
const CHOLESKY_JITTER: f64 = 1e-8;

/// Horizon-indexed structural responses to a unit shock.
///
/// Cached by the fitted model and recomputed from scratch whenever the
/// posterior is re-estimated; entries are `N_VARS x N_VARS` matrices where
/// `[i, j]` is the response of variable `i` to a unit structural shock in
/// variable `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralIrfSet {
    horizons: Vec<DMatrix<f64>>,
    peak_response_horizon: usize,
}

impl StructuralIrfSet {
    /// Response matrices indexed by horizon, `0..=max_horizon`.
    #[inline]
    pub fn horizons(&self) -> &[DMatrix<f64>] {
        &self.horizons
    }

    /// Largest horizon covered.
    #[inline]
    pub fn max_horizon(&self) -> usize {
        self.horizons.len() - 1
    }

    /// Response of the response variable to the unit foreign shock at each
    /// horizon (`0..=max_horizon`).
    pub fn response_path(&self) -> Vec<f64> {
        self.horizons.iter().map(|m| m[(1, 0)]).collect()
    }

    /// Horizon (in months, ≥ 1) at which the absolute response of the
    /// response variable peaks.
    ///
    /// Drives the calendar decay selection downstream. Horizon 0 is
    /// excluded: calendar mapping cares about when the pass-through peaks,
    /// not the contemporaneous impact.
    #[inline]
    pub fn peak_response_horizon(&self) -> usize {
        self.peak_response_horizon
    }
}

/// Computes structural IRF sets from a posterior estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralIrfCalculator;

impl StructuralIrfCalculator {
    /// Computes responses for horizons `0..=max_horizon`.
    ///
    /// The Cholesky factor of `Sigma + εI` is used directly when it exists;
    /// otherwise Sigma is projected onto the PSD cone and factorization is
    /// retried once.
    ///
    /// # Errors
    ///
    /// - [`EstimationError::CovarianceNotPsd`] if factorization fails even
    ///   after projection
    /// - [`EstimationError::NumericalInstability`] if the shock variance is
    ///   degenerate (normalization would divide by ~0)
    pub fn compute(
        posterior: &PosteriorEstimate,
        max_horizon: usize,
    ) -> Result<StructuralIrfSet, EstimationError> {
        let l = match safe_cholesky(posterior.sigma(), CHOLESKY_JITTER) {
            Some(l) => l,
            None => {
                let repaired = project_psd(posterior.sigma(), CHOLESKY_JITTER);
                safe_cholesky(&repaired, CHOLESKY_JITTER)
                    .ok_or(EstimationError::CovarianceNotPsd)?
            }
        };

        let impact = l[(0, 0)];
        if impact.abs() < 1e-12 {
            return Err(EstimationError::instability(
                "degenerate shock variance; cannot normalize to a unit shock",
            ));
        }
        let l_unit = l / impact;

        let companion = StabilityChecker::companion_matrix(posterior);
        let dim = companion.nrows();

        let mut horizons = Vec::with_capacity(max_horizon + 1);
        horizons.push(l_unit.clone());

        let mut power = DMatrix::<f64>::identity(dim, dim);
        for _ in 1..=max_horizon {
            power = &companion * power;
            let top = power.view((0, 0), (N_VARS, N_VARS)).clone_owned();
            horizons.push(top * &l_unit);
        }

        let peak_response_horizon = horizons
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|(_, a), (_, b)| {
                a[(1, 0)]
                    .abs()
                    .partial_cmp(&b[(1, 0)].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(h, _)| h)
            .unwrap_or(1);

        Ok(StructuralIrfSet {
            horizons,
            peak_response_horizon,
        })
    }
}
