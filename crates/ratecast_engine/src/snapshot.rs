//! Audit snapshots: full JSON-serializable model state.
//!
//! A snapshot carries everything needed to reconstruct a fitted forecaster
//! — hyperparameters, Beta/Sigma, the LP horizon bundle, training window,
//! variance scale, seed, and the training-data fingerprint. Loading runs a
//! self-check (Sigma symmetric PSD, Beta shape, LP horizon count) and fails
//! fast on any violation: a missing or corrupt artifact never degrades
//! into synthetic output. Stability and IRFs are recomputed from the
//! loaded matrices rather than trusted from storage.

use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::info;

use ratecast_core::math::linalg::min_symmetric_eigenvalue;
use ratecast_core::{ScaleInfo, N_VARS};
use ratecast_models::{FittedBvar, HorizonModel, LpModelSet, PosteriorEstimate};

use crate::error::SnapshotError;
use crate::orchestrator::{ForecasterConfig, RateForecaster};

/// Snapshot format version written and accepted by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Asymmetry tolerance for the loaded residual covariance.
const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// Eigenvalue tolerance for the loaded residual covariance.
const PSD_TOLERANCE: f64 = 1e-6;

/// Full serializable model state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Snapshot format version.
    pub format_version: u32,
    /// Monte-Carlo RNG seed.
    pub seed: u64,
    /// FNV-1a fingerprint of the training data.
    pub data_fingerprint: u64,
    /// Complete component configuration.
    pub config: ForecasterConfig,
    /// BVAR coefficient matrix, row-major (`N_VARS` rows).
    pub beta: Vec<Vec<f64>>,
    /// Residual covariance, row-major (`N_VARS` rows).
    pub sigma: Vec<Vec<f64>>,
    /// In-sample R² per equation (shock first).
    pub r_squared: [f64; 2],
    /// Design rows used by the posterior update.
    pub n_obs: usize,
    /// Empirical variance scale at fit time.
    pub scale: ScaleInfo,
    /// First training month.
    pub train_start: NaiveDate,
    /// Last training month.
    pub train_end: NaiveDate,
    /// Stability flag at fit time (audit field; recomputed on load).
    pub stable: bool,
    /// Max companion eigenvalue modulus at fit time (audit field).
    pub max_eigen_modulus: f64,
    /// Last `lag_order` observations, oldest first.
    pub recent_observations: Vec<[f64; 2]>,
    /// Fitted LP horizon bundle.
    pub lp_horizons: Vec<HorizonModel>,
}

impl RateForecaster {
    /// Captures the full model state for audit or persistence.
    pub fn to_snapshot(&self) -> ModelSnapshot {
        let posterior = self.bvar().posterior();
        let verdict = self.bvar().verdict();
        let (train_start, train_end) = self.bvar().train_range();
        ModelSnapshot {
            format_version: FORMAT_VERSION,
            seed: self.config().monte_carlo.seed(),
            data_fingerprint: self.bvar().data_fingerprint(),
            config: *self.config(),
            beta: matrix_rows(posterior.beta()),
            sigma: matrix_rows(posterior.sigma()),
            r_squared: *posterior.r_squared(),
            n_obs: posterior.n_obs(),
            scale: self.bvar().scale(),
            train_start,
            train_end,
            stable: verdict.stable,
            max_eigen_modulus: verdict.max_modulus,
            recent_observations: self.bvar().recent_observations().to_vec(),
            lp_horizons: self.lp().horizons().to_vec(),
        }
    }

    /// Serializes the snapshot to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    /// Rebuilds a forecaster from a snapshot, running the full self-check.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::UnsupportedVersion`] on a format mismatch
    /// - [`SnapshotError::IntegrityCheckFailed`] when Sigma is not a
    ///   symmetric PSD 2×2, Beta does not match `(k, 1 + k·p)`, or the LP
    ///   bundle is empty
    /// - [`SnapshotError::Estimation`] when reconstruction fails
    pub fn from_snapshot(snapshot: ModelSnapshot) -> Result<RateForecaster, SnapshotError> {
        if snapshot.format_version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.format_version,
                expected: FORMAT_VERSION,
            });
        }
        snapshot
            .config
            .validate()
            .map_err(ratecast_models::EstimationError::from)?;

        let beta = rows_matrix(&snapshot.beta)
            .ok_or_else(|| SnapshotError::integrity("beta rows have unequal lengths"))?;
        let expected_cols = 1 + N_VARS * snapshot.config.bvar.lag_order;
        if beta.nrows() != N_VARS || beta.ncols() != expected_cols {
            return Err(SnapshotError::integrity(format!(
                "beta shape ({}, {}) does not match ({}, {})",
                beta.nrows(),
                beta.ncols(),
                N_VARS,
                expected_cols
            )));
        }

        let sigma = rows_matrix(&snapshot.sigma)
            .ok_or_else(|| SnapshotError::integrity("sigma rows have unequal lengths"))?;
        if sigma.nrows() != N_VARS || sigma.ncols() != N_VARS {
            return Err(SnapshotError::integrity(format!(
                "sigma shape ({}, {}) is not {}x{}",
                sigma.nrows(),
                sigma.ncols(),
                N_VARS,
                N_VARS
            )));
        }
        for i in 0..N_VARS {
            for j in 0..N_VARS {
                if (sigma[(i, j)] - sigma[(j, i)]).abs() > SYMMETRY_TOLERANCE {
                    return Err(SnapshotError::integrity("sigma is not symmetric"));
                }
            }
        }
        if min_symmetric_eigenvalue(&sigma) < -PSD_TOLERANCE {
            return Err(SnapshotError::integrity(
                "sigma is not positive semi-definite",
            ));
        }

        if snapshot.lp_horizons.is_empty() {
            return Err(SnapshotError::integrity(
                "no local-projections horizons in artifact",
            ));
        }

        let posterior =
            PosteriorEstimate::from_parts(beta, sigma, snapshot.n_obs, snapshot.r_squared)?;
        let bvar = FittedBvar::from_parts(
            snapshot.config.bvar,
            posterior,
            snapshot.scale,
            (snapshot.train_start, snapshot.train_end),
            snapshot.data_fingerprint,
            snapshot.recent_observations,
        )?;
        let lp = LpModelSet::from_parts(snapshot.config.lp, snapshot.lp_horizons)?;

        info!(
            data_fingerprint = snapshot.data_fingerprint,
            lp_horizons = lp.len(),
            "snapshot loaded and verified"
        );

        Ok(RateForecaster::from_fitted(snapshot.config, bvar, lp))
    }

    /// Parses and verifies a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`from_snapshot`](Self::from_snapshot), plus
    /// [`SnapshotError::Malformed`] on unparseable input.
    pub fn from_json(json: &str) -> Result<RateForecaster, SnapshotError> {
        let snapshot: ModelSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }
}

fn matrix_rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    (0..matrix.nrows())
        .map(|i| matrix.row(i).iter().cloned().collect())
        .collect()
}

fn rows_matrix(rows: &[Vec<f64>]) -> Option<DMatrix<f64>> {
    let nrows = rows.len();
    let ncols = rows.first()?.len();
    if rows.iter().any(|r| r.len() != ncols) {
        return None;
    }
    let flat: Vec<f64> = rows.iter().flatten().cloned().collect();
    Some(DMatrix::from_row_slice(nrows, ncols, &flat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::{EngineKind, PredictRequest};
    use chrono::NaiveDate;
    use ratecast_core::AlignedSeries;
    use ratecast_models::lp::BootstrapConfig;

    fn month_grid(n: usize) -> Vec<NaiveDate> {
        let mut months = Vec::with_capacity(n);
        let mut year = 2019;
        let mut month = 1;
        for _ in 0..n {
            months.push(NaiveDate::from_ymd_opt(year, month, 1).unwrap());
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        months
    }

    fn fitted() -> RateForecaster {
        let n = 50;
        let shock: Vec<f64> = (0..n).map(|t| (t as f64 * 1.7).sin() * 25.0).collect();
        let response: Vec<f64> = (0..n)
            .map(|t| 0.3 * (t as f64 * 1.7).sin() * 25.0 + (t as f64 * 0.8).cos() * 5.0)
            .collect();
        let series = AlignedSeries::new(month_grid(n), shock, response).unwrap();
        let config = ForecasterConfig {
            bootstrap: BootstrapConfig {
                n_resamples: 100,
                seed: 3,
            },
            ..Default::default()
        };
        RateForecaster::fit(config, &series).unwrap().into_value()
    }

    #[test]
    fn test_round_trip_preserves_beta_sigma_and_evaluate() {
        let original = fitted();
        let json = original.to_json().unwrap();
        let restored = RateForecaster::from_json(&json).unwrap();

        assert_eq!(
            original.bvar().posterior().beta(),
            restored.bvar().posterior().beta()
        );
        assert_eq!(
            original.bvar().posterior().sigma(),
            restored.bvar().posterior().sigma()
        );
        assert_eq!(original.evaluate(), restored.evaluate());
    }

    #[test]
    fn test_round_trip_preserves_predictions() {
        let original = fitted();
        let restored = RateForecaster::from_json(&original.to_json().unwrap()).unwrap();
        let request = PredictRequest {
            engine: EngineKind::Bvar,
            shock_path: vec![25.0, 25.0],
            horizon: 3,
            meetings: vec![],
        };
        assert_eq!(
            original.predict(&request).unwrap(),
            restored.predict(&request).unwrap()
        );
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut snapshot = fitted().to_snapshot();
        snapshot.format_version = 99;
        assert!(matches!(
            RateForecaster::from_snapshot(snapshot),
            Err(SnapshotError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_bad_beta_shape_rejected() {
        let mut snapshot = fitted().to_snapshot();
        snapshot.beta[0].pop();
        let result = RateForecaster::from_snapshot(snapshot);
        assert!(matches!(
            result,
            Err(SnapshotError::IntegrityCheckFailed { .. })
        ));
    }

    #[test]
    fn test_non_psd_sigma_rejected() {
        let mut snapshot = fitted().to_snapshot();
        snapshot.sigma = vec![vec![1.0, 2.0], vec![2.0, 1.0]];
        let result = RateForecaster::from_snapshot(snapshot);
        match result {
            Err(SnapshotError::IntegrityCheckFailed { detail }) => {
                assert!(detail.contains("positive semi-definite"));
            }
            other => panic!("expected integrity failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_asymmetric_sigma_rejected() {
        let mut snapshot = fitted().to_snapshot();
        snapshot.sigma[0][1] += 1.0;
        let result = RateForecaster::from_snapshot(snapshot);
        assert!(matches!(
            result,
            Err(SnapshotError::IntegrityCheckFailed { .. })
        ));
    }

    #[test]
    fn test_empty_lp_bundle_rejected() {
        let mut snapshot = fitted().to_snapshot();
        snapshot.lp_horizons.clear();
        let result = RateForecaster::from_snapshot(snapshot);
        match result {
            Err(SnapshotError::IntegrityCheckFailed { detail }) => {
                assert!(detail.contains("local-projections"));
            }
            other => panic!("expected integrity failure, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_garbage_json_rejected() {
        assert!(matches!(
            RateForecaster::from_json("{not json"),
            Err(SnapshotError::Malformed(_))
        ));
    }
}
