//! Per-horizon local-projections estimation with AIC lag selection.

use nalgebra::{DMatrix, DVector};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use ratecast_core::{Advisory, AlignedSeries, ConfigurationError, Outcome};

use super::bootstrap::{BootstrapCi, BootstrapConfig};
use super::regression::Shrinkage;
use crate::error::EstimationError;

/// Minimum usable rows for a horizon to be fit at all.
pub const MIN_ROWS_PER_HORIZON: usize = 10;

/// Local-projections configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpConfig {
    /// Largest horizon (months ahead) to fit.
    pub max_horizon: usize,
    /// Largest control-lag order considered by AIC selection.
    pub max_lags: usize,
    /// Shrinkage family and strength.
    pub shrinkage: Shrinkage,
}

impl Default for LpConfig {
    fn default() -> Self {
        Self {
            max_horizon: 6,
            max_lags: 4,
            shrinkage: Shrinkage::default(),
        }
    }
}

impl LpConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] on a zero or excessive horizon/lag
    /// bound, or an invalid shrinkage penalty.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.shrinkage.validate()?;
        if self.max_horizon == 0 || self.max_horizon > 24 {
            return Err(ConfigurationError::InvalidParameter {
                name: "max_horizon",
                detail: format!("{} outside supported range [1, 24]", self.max_horizon),
            });
        }
        if self.max_lags == 0 || self.max_lags > 12 {
            return Err(ConfigurationError::InvalidParameter {
                name: "max_lags",
                detail: format!("{} outside supported range [1, 12]", self.max_lags),
            });
        }
        Ok(())
    }
}

/// A fitted single-horizon projection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HorizonModel {
    /// Months ahead.
    pub horizon: usize,
    /// Coefficient on the contemporaneous shock — the horizon IRF in bps
    /// per bp of shock.
    pub shock_coefficient: f64,
    /// In-sample R², clamped to `[0, 1]`.
    pub r_squared: f64,
    /// Control-lag order chosen by AIC.
    pub lag_order: usize,
    /// Usable rows after lead/lag alignment.
    pub n_obs: usize,
    /// Bootstrap 95% confidence interval on the shock coefficient, when
    /// computed.
    pub ci95: Option<(f64, f64)>,
}

/// The full set of fitted horizon models.
#[derive(Debug, Clone, PartialEq)]
pub struct LpModelSet {
    config: LpConfig,
    horizons: Vec<HorizonModel>,
}

impl LpModelSet {
    /// Reassembles a model set from persisted parts (snapshot load).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the configuration is invalid or
    /// the horizon list is empty.
    pub fn from_parts(
        config: LpConfig,
        horizons: Vec<HorizonModel>,
    ) -> Result<Self, EstimationError> {
        config.validate()?;
        if horizons.is_empty() {
            return Err(ConfigurationError::InvalidParameter {
                name: "horizons",
                detail: "at least one fitted horizon is required".to_string(),
            }
            .into());
        }
        Ok(Self { config, horizons })
    }

    /// Configuration used for the fit.
    #[inline]
    pub fn config(&self) -> &LpConfig {
        &self.config
    }

    /// Fitted horizon models in increasing horizon order.
    #[inline]
    pub fn horizons(&self) -> &[HorizonModel] {
        &self.horizons
    }

    /// The model for horizon `h`, if it was fit.
    pub fn horizon(&self, h: usize) -> Option<&HorizonModel> {
        self.horizons.iter().find(|m| m.horizon == h)
    }

    /// Number of fitted horizons.
    #[inline]
    pub fn len(&self) -> usize {
        self.horizons.len()
    }

    /// True when no horizon was fit.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.horizons.is_empty()
    }

    /// Horizon (≥ 1) with the largest absolute shock coefficient.
    pub fn peak_response_horizon(&self) -> usize {
        self.horizons
            .iter()
            .max_by(|a, b| {
                a.shock_coefficient
                    .abs()
                    .partial_cmp(&b.shock_coefficient.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|m| m.horizon)
            .unwrap_or(1)
    }

    /// Mean R² across fitted horizons.
    pub fn mean_r_squared(&self) -> f64 {
        if self.horizons.is_empty() {
            return 0.0;
        }
        self.horizons.iter().map(|m| m.r_squared).sum::<f64>() / self.horizons.len() as f64
    }
}

/// Fits local projections across all requested horizons.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProjectionsEstimator;

impl LocalProjectionsEstimator {
    /// Fits every horizon in `1..=max_horizon` independently.
    ///
    /// Horizons with fewer than [`MIN_ROWS_PER_HORIZON`] usable rows are
    /// skipped with an advisory; a per-horizon regression failure likewise
    /// skips only that horizon.
    ///
    /// # Errors
    ///
    /// - [`EstimationError::Configuration`] on invalid configuration
    /// - [`EstimationError::InsufficientData`] when no horizon could be fit
    pub fn fit(
        config: LpConfig,
        series: &AlignedSeries,
    ) -> Result<Outcome<LpModelSet>, EstimationError> {
        config.validate()?;

        let horizons: Vec<usize> = (1..=config.max_horizon).collect();

        #[cfg(feature = "parallel")]
        let fitted: Vec<Option<HorizonModel>> = horizons
            .par_iter()
            .map(|&h| Self::fit_horizon(&config, series, h))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let fitted: Vec<Option<HorizonModel>> = horizons
            .iter()
            .map(|&h| Self::fit_horizon(&config, series, h))
            .collect();

        let mut advisories = Vec::new();
        let mut models = Vec::new();
        for (h, model) in horizons.iter().zip(fitted) {
            match model {
                Some(m) => models.push(m),
                None => advisories.push(Advisory::SkippedHorizon {
                    horizon: *h,
                    usable_rows: series.len().saturating_sub(h + 1),
                }),
            }
        }

        if models.is_empty() {
            return Err(EstimationError::InsufficientData {
                required: MIN_ROWS_PER_HORIZON + 2,
                provided: series.len(),
            });
        }

        let set = LpModelSet {
            config,
            horizons: models,
        };
        Ok(Outcome::new(set, advisories))
    }

    /// Fits all horizons and attaches bootstrap confidence intervals.
    ///
    /// Bootstrap failures are isolated per horizon: the model keeps
    /// `ci95 = None` rather than aborting the set.
    ///
    /// # Errors
    ///
    /// Same as [`fit`](Self::fit).
    pub fn fit_with_ci(
        config: LpConfig,
        bootstrap: &BootstrapConfig,
        series: &AlignedSeries,
    ) -> Result<Outcome<LpModelSet>, EstimationError> {
        bootstrap.validate()?;
        let (mut set, advisories) = Self::fit(config, series)?.into_parts();
        for model in &mut set.horizons {
            model.ci95 = BootstrapCi::confidence_interval(
                series,
                model.horizon,
                model.lag_order,
                &config.shrinkage,
                bootstrap,
            )
            .ok();
        }
        Ok(Outcome::new(set, advisories))
    }

    /// Fits a single horizon; `None` skips it (thin sample or regression
    /// failure).
    fn fit_horizon(
        config: &LpConfig,
        series: &AlignedSeries,
        horizon: usize,
    ) -> Option<HorizonModel> {
        let mut best: Option<(f64, HorizonModel)> = None;

        for lags in 1..=config.max_lags {
            let (x, y) = match horizon_design(series, horizon, lags) {
                Some(d) => d,
                None => continue,
            };
            if x.nrows() < MIN_ROWS_PER_HORIZON {
                continue;
            }
            let fit = match config.shrinkage.fit(&x, &y) {
                Ok(f) => f,
                Err(_) => continue,
            };

            let n_rows = x.nrows() as f64;
            let n_params = (2 + 2 * lags) as f64;
            let aic = n_rows * (fit.ssr / n_rows + 1e-12).ln() + 2.0 * n_params;

            let candidate = HorizonModel {
                horizon,
                shock_coefficient: fit.coefficients[1],
                r_squared: fit.r_squared,
                lag_order: lags,
                n_obs: x.nrows(),
                ci95: None,
            };
            match &best {
                Some((best_aic, _)) if aic >= *best_aic => {}
                _ => best = Some((aic, candidate)),
            }
        }

        best.map(|(_, model)| model)
    }
}

/// Builds the design for one horizon.
///
/// Row `t` (for `t` in `lags..n-horizon`) is
/// `[1, shock_t, response_{t-1..t-lags}, shock_{t-1..t-lags}]` and the
/// target is `response_{t+horizon}`. Returns `None` when no rows remain.
pub(crate) fn horizon_design(
    series: &AlignedSeries,
    horizon: usize,
    lags: usize,
) -> Option<(DMatrix<f64>, DVector<f64>)> {
    let n = series.len();
    if n <= horizon + lags {
        return None;
    }
    let rows = n - horizon - lags;
    let cols = 2 + 2 * lags;
    let shock = series.shock();
    let response = series.response();

    let mut x = DMatrix::<f64>::zeros(rows, cols);
    let mut y = DVector::<f64>::zeros(rows);
    for (row, t) in (lags..n - horizon).enumerate() {
        x[(row, 0)] = 1.0;
        x[(row, 1)] = shock[t];
        for lag in 1..=lags {
            x[(row, 1 + lag)] = response[t - lag];
            x[(row, 1 + lags + lag)] = shock[t - lag];
        }
        y[row] = response[t + horizon];
    }
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

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

    fn synthetic_series(n: usize) -> AlignedSeries {
        let shock: Vec<f64> = (0..n).map(|t| (t as f64 * 1.1).sin() * 25.0).collect();
        let response: Vec<f64> = (0..n)
            .map(|t| 0.3 * (t as f64 * 1.1).sin() * 25.0 + (t as f64 * 0.6).cos() * 8.0)
            .collect();
        AlignedSeries::new(month_grid(n), shock, response).unwrap()
    }

    #[test]
    fn test_horizon_design_shapes() {
        let series = synthetic_series(30);
        let (x, y) = horizon_design(&series, 2, 3).unwrap();
        assert_eq!(x.nrows(), 30 - 2 - 3);
        assert_eq!(x.ncols(), 2 + 2 * 3);
        assert_eq!(y.len(), x.nrows());
        // Intercept column and contemporaneous shock column.
        assert_eq!(x[(0, 0)], 1.0);
        assert_eq!(x[(0, 1)], series.shock()[3]);
        assert_eq!(y[0], series.response()[5]);
    }

    #[test]
    fn test_fit_fifty_obs_six_horizons() {
        let config = LpConfig {
            max_horizon: 6,
            max_lags: 3,
            shrinkage: Shrinkage::Ridge { alpha: 0.1 },
        };
        let outcome = LocalProjectionsEstimator::fit(config, &synthetic_series(50)).unwrap();
        let set = outcome.into_value();
        assert_eq!(set.len(), 6);
        for model in set.horizons() {
            assert!((0.0..=1.0).contains(&model.r_squared));
            assert!(model.lag_order >= 1 && model.lag_order <= 3);
            assert!(model.n_obs >= MIN_ROWS_PER_HORIZON);
        }
    }

    #[test]
    fn test_long_horizons_trimmed_on_short_sample() {
        // 16 observations: horizon 6 with even one lag leaves 9 rows, below
        // the guard, so the tail horizons are skipped with advisories.
        let config = LpConfig {
            max_horizon: 6,
            max_lags: 2,
            shrinkage: Shrinkage::default(),
        };
        let outcome = LocalProjectionsEstimator::fit(config, &synthetic_series(16)).unwrap();
        let (set, advisories) = outcome.into_parts();
        assert!(set.len() < 6);
        assert!(!advisories.is_empty());
        assert!(advisories
            .iter()
            .any(|a| matches!(a, Advisory::SkippedHorizon { horizon: 6, .. })));
    }

    #[test]
    fn test_no_horizon_fits_is_an_error() {
        let config = LpConfig::default();
        let result = LocalProjectionsEstimator::fit(config, &synthetic_series(8));
        assert!(matches!(
            result,
            Err(EstimationError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_fit_recovers_contemporaneous_passthrough() {
        // response_t = 0.3 shock_t exactly: horizon 1 regresses t+1 on t, so
        // the *lagged* structure is weak, but the design still includes the
        // contemporaneous shock for the led target. With a pure
        // contemporaneous relation the horizon-1 coefficient reflects the
        // shock autocorrelation; just check the fit runs and is bounded.
        let n = 50;
        let shock: Vec<f64> = (0..n).map(|t| (t as f64 * 1.7).sin() * 25.0).collect();
        let response: Vec<f64> = shock.iter().map(|s| 0.3 * s).collect();
        let series = AlignedSeries::new(month_grid(n), shock, response).unwrap();

        let outcome = LocalProjectionsEstimator::fit(LpConfig::default(), &series).unwrap();
        let set = outcome.into_value();
        assert!(!set.is_empty());
        for model in set.horizons() {
            assert!(model.shock_coefficient.is_finite());
        }
    }

    #[test]
    fn test_model_set_lookup_and_peak() {
        let outcome =
            LocalProjectionsEstimator::fit(LpConfig::default(), &synthetic_series(60)).unwrap();
        let set = outcome.into_value();
        assert!(set.horizon(1).is_some());
        assert!(set.horizon(99).is_none());
        let peak = set.peak_response_horizon();
        assert!(peak >= 1 && peak <= 6);
        assert!((0.0..=1.0).contains(&set.mean_r_squared()));
    }

    #[test]
    fn test_from_parts_rejects_empty() {
        assert!(LpModelSet::from_parts(LpConfig::default(), vec![]).is_err());
    }
}
