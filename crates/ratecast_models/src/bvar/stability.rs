//! Companion-matrix stability diagnostics.
//!
//! A p-lag VAR rewrites as a first-order system on the stacked state
//! `[y_t, y_{t-1}, ..., y_{t-p+1}]`; the process is covariance-stationary
//! iff every eigenvalue of the companion matrix lies strictly inside the
//! unit circle. Instability is reported as an advisory flag and never
//! suppresses model use.

use nalgebra::DMatrix;
use ratecast_core::math::linalg::spectral_radius;
use ratecast_core::N_VARS;

use super::posterior::PosteriorEstimate;

/// Stability diagnosis derived from a posterior estimate.
///
/// Recomputed whenever the posterior changes; it carries no state of its
/// own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StabilityVerdict {
    /// True when the largest eigenvalue modulus is below one.
    pub stable: bool,
    /// Largest eigenvalue modulus of the companion matrix.
    pub max_modulus: f64,
}

/// Computes companion matrices and stability verdicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilityChecker;

impl StabilityChecker {
    /// Builds the `(N_VARS·p) x (N_VARS·p)` companion matrix.
    ///
    /// Top block rows hold `[A₁ ... A_p]`; sub-diagonal identity blocks
    /// shift the state.
    pub fn companion_matrix(posterior: &PosteriorEstimate) -> DMatrix<f64> {
        let p = posterior.lag_order();
        let dim = N_VARS * p;
        let mut companion = DMatrix::<f64>::zeros(dim, dim);

        for lag in 1..=p {
            let block = posterior.lag_block(lag);
            let col_base = (lag - 1) * N_VARS;
            for i in 0..N_VARS {
                for j in 0..N_VARS {
                    companion[(i, col_base + j)] = block[(i, j)];
                }
            }
        }
        for r in N_VARS..dim {
            companion[(r, r - N_VARS)] = 1.0;
        }
        companion
    }

    /// Diagnoses stability from the companion spectrum.
    pub fn check(posterior: &PosteriorEstimate) -> StabilityVerdict {
        let max_modulus = spectral_radius(&Self::companion_matrix(posterior));
        StabilityVerdict {
            stable: max_modulus < 1.0,
            max_modulus,
        }
    }
}
