//! The conditional Monte-Carlo forecast recursion.
//!
//! Horizons run in strictly increasing order — each horizon's output feeds
//! the next horizon's lag state, so the recursion is inherently
//! sequential. Per horizon:
//!
//! 1. The deterministic AR contribution is computed from the current lag
//!    state (the last `p` observations).
//! 2. The imposed shock pins the shock coordinate: the first structural
//!    innovation is backed out of the Cholesky factor as
//!    `ε₀ = (imposed − μ_shock) / L[0,0]`, so every draw carries exactly the
//!    imposed shock while the contemporaneous covariance flows through to
//!    the response.
//! 3. The remaining innovation is drawn from the local seeded RNG and the
//!    response draws are aggregated into mean/std and 10/90/2.5/97.5
//!    percentiles.
//! 4. `(imposed shock, mean response)` is appended to the lag state and the
//!    oldest row dropped.

use nalgebra::DMatrix;
use ratecast_core::math::linalg::safe_cholesky;
use ratecast_core::math::stats::{mean, percentile, sample_std};
use ratecast_core::N_VARS;
use ratecast_models::FittedBvar;

use super::config::{MonteCarloConfig, ShockExtension, MAX_HORIZON};
use crate::error::ForecastError;
use crate::rng::ForecastRng;

/// Jitter added before the forecast-time Cholesky check.
const CHOLESKY_JITTER: f64 = 1e-8;

/// One horizon of a conditional forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonForecast {
    /// Months ahead (1-based).
    pub horizon: usize,
    /// Mean response move in basis points.
    pub mean: f64,
    /// Standard deviation of the response draws.
    pub std: f64,
    /// 10th/90th percentile band.
    pub ci80: (f64, f64),
    /// 2.5th/97.5th percentile band.
    pub ci95: (f64, f64),
    /// The shock value imposed at this horizon.
    pub imposed_shock: f64,
}

/// A conditional forecast across horizons `1..=H`.
///
/// Horizons are strictly increasing by construction. The path is created
/// per inference call and discarded after the response is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPath {
    horizons: Vec<HorizonForecast>,
}

impl ForecastPath {
    /// Per-horizon forecasts in increasing horizon order.
    #[inline]
    pub fn horizons(&self) -> &[HorizonForecast] {
        &self.horizons
    }

    /// The forecast at months-ahead `h`, if within the path.
    pub fn at(&self, h: usize) -> Option<&HorizonForecast> {
        self.horizons.iter().find(|f| f.horizon == h)
    }

    /// The final horizon of the path.
    ///
    /// The path always holds at least one horizon.
    #[inline]
    pub fn last(&self) -> &HorizonForecast {
        &self.horizons[self.horizons.len() - 1]
    }

    /// Number of horizons.
    #[inline]
    pub fn len(&self) -> usize {
        self.horizons.len()
    }

    /// Always false; a path carries at least one horizon.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.horizons.is_empty()
    }
}

/// Runs conditional Monte-Carlo forecasts against a fitted BVAR.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalForecaster;

impl ConditionalForecaster {
    /// Forecasts horizons `1..=horizon` under the imposed shock path.
    ///
    /// `shock_path[h-1]` is the shock move imposed at horizon `h`; horizons
    /// beyond the path follow the configured [`ShockExtension`] policy.
    /// Reproducibility contract: identical seed and inputs produce a
    /// bit-identical path, independent of any other RNG use in the process.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::InvalidHorizon`] when `horizon` is zero or above
    ///   [`MAX_HORIZON`]
    /// - [`ForecastError::EmptyShockPath`] when no shock value is given
    /// - [`ForecastError::SigmaNotPsd`] when the residual covariance fails
    ///   its defensive factorization check
    /// - [`ForecastError::InvalidInput`] on non-finite shock values or a
    ///   degenerate shock variance
    pub fn forecast(
        model: &FittedBvar,
        shock_path: &[f64],
        horizon: usize,
        config: &MonteCarloConfig,
    ) -> Result<ForecastPath, ForecastError> {
        config.validate()?;
        if horizon == 0 || horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidHorizon {
                horizon,
                max: MAX_HORIZON,
            });
        }
        if shock_path.is_empty() {
            return Err(ForecastError::EmptyShockPath);
        }
        if shock_path.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::invalid_input("non-finite imposed shock"));
        }

        let posterior = model.posterior();
        let chol = safe_cholesky(posterior.sigma(), CHOLESKY_JITTER)
            .ok_or(ForecastError::SigmaNotPsd)?;
        let l00 = chol[(0, 0)];
        if l00 < 1e-12 {
            return Err(ForecastError::invalid_input(
                "degenerate shock variance in residual covariance",
            ));
        }
        let l10 = chol[(1, 0)];
        let l11 = chol[(1, 1)];

        let p = posterior.lag_order();
        let intercept = posterior.intercept();
        let lag_blocks: Vec<DMatrix<f64>> = (1..=p).map(|l| posterior.lag_block(l)).collect();

        let mut state: Vec<[f64; N_VARS]> = model.recent_observations().to_vec();
        let mut rng = ForecastRng::from_seed(config.seed());
        let mut draws = vec![0.0f64; config.n_draws()];
        let mut horizons = Vec::with_capacity(horizon);

        for h in 1..=horizon {
            let imposed = match shock_path.get(h - 1) {
                Some(&v) => v,
                None => match config.shock_extension() {
                    ShockExtension::HoldLast => shock_path[shock_path.len() - 1],
                    ShockExtension::Zero => 0.0,
                },
            };

            // Deterministic AR contribution from the lag state.
            let mut mu = [intercept[0], intercept[1]];
            for (block, obs) in lag_blocks.iter().zip(state.iter().rev()) {
                for (i, mu_i) in mu.iter_mut().enumerate() {
                    *mu_i += block[(i, 0)] * obs[0] + block[(i, 1)] * obs[1];
                }
            }

            // Structural innovation implied by the imposed shock.
            let eps0 = (imposed - mu[0]) / l00;
            let conditional_mean = mu[1] + l10 * eps0;

            for draw in draws.iter_mut() {
                *draw = conditional_mean + l11 * rng.gen_normal();
            }

            let mean_response = mean(&draws);
            horizons.push(HorizonForecast {
                horizon: h,
                mean: mean_response,
                std: sample_std(&draws),
                ci80: (percentile(&draws, 10.0), percentile(&draws, 90.0)),
                ci95: (percentile(&draws, 2.5), percentile(&draws, 97.5)),
                imposed_shock: imposed,
            });

            state.remove(0);
            state.push([imposed, mean_response]);
        }

        Ok(ForecastPath { horizons })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratecast_core::AlignedSeries;
    use ratecast_models::BvarConfig;

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

    fn fitted_model() -> FittedBvar {
        let n = 48;
        let shock: Vec<f64> = (0..n).map(|t| (t as f64 * 1.7).sin() * 25.0).collect();
        let response: Vec<f64> = (0..n)
            .map(|t| 0.3 * (t as f64 * 1.7).sin() * 25.0 + (t as f64 * 0.8).cos() * 5.0)
            .collect();
        let series = AlignedSeries::new(month_grid(n), shock, response).unwrap();
        FittedBvar::fit(BvarConfig::default(), &series)
            .unwrap()
            .into_value()
    }

    #[test]
    fn test_forecast_shapes_and_monotone_horizons() {
        let model = fitted_model();
        let config = MonteCarloConfig::default();
        let path =
            ConditionalForecaster::forecast(&model, &[25.0, 25.0], 4, &config).unwrap();
        assert_eq!(path.len(), 4);
        for (i, f) in path.horizons().iter().enumerate() {
            assert_eq!(f.horizon, i + 1);
            assert!(f.std >= 0.0);
            assert!(f.ci95.0 <= f.ci80.0);
            assert!(f.ci80.1 <= f.ci95.1);
            assert!(f.ci80.0 <= f.ci80.1);
        }
    }

    #[test]
    fn test_same_seed_bit_identical() {
        let model = fitted_model();
        let config = MonteCarloConfig::builder().seed(99).build().unwrap();
        let a = ConditionalForecaster::forecast(&model, &[25.0], 6, &config).unwrap();
        let b = ConditionalForecaster::forecast(&model, &[25.0], 6, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_differs() {
        let model = fitted_model();
        let a = ConditionalForecaster::forecast(
            &model,
            &[25.0],
            3,
            &MonteCarloConfig::builder().seed(1).build().unwrap(),
        )
        .unwrap();
        let b = ConditionalForecaster::forecast(
            &model,
            &[25.0],
            3,
            &MonteCarloConfig::builder().seed(2).build().unwrap(),
        )
        .unwrap();
        assert_ne!(a.horizons()[0].mean, b.horizons()[0].mean);
    }

    #[test]
    fn test_hold_last_extension() {
        let model = fitted_model();
        let config = MonteCarloConfig::default();
        let path = ConditionalForecaster::forecast(&model, &[25.0, 50.0], 4, &config).unwrap();
        assert_eq!(path.horizons()[2].imposed_shock, 50.0);
        assert_eq!(path.horizons()[3].imposed_shock, 50.0);
    }

    #[test]
    fn test_zero_extension() {
        let model = fitted_model();
        let config = MonteCarloConfig::builder()
            .shock_extension(ShockExtension::Zero)
            .build()
            .unwrap();
        let path = ConditionalForecaster::forecast(&model, &[25.0], 3, &config).unwrap();
        assert_eq!(path.horizons()[0].imposed_shock, 25.0);
        assert_eq!(path.horizons()[1].imposed_shock, 0.0);
        assert_eq!(path.horizons()[2].imposed_shock, 0.0);
    }

    #[test]
    fn test_empty_shock_path_rejected() {
        let model = fitted_model();
        let result =
            ConditionalForecaster::forecast(&model, &[], 3, &MonteCarloConfig::default());
        assert!(matches!(result, Err(ForecastError::EmptyShockPath)));
    }

    #[test]
    fn test_invalid_horizon_rejected() {
        let model = fitted_model();
        let config = MonteCarloConfig::default();
        assert!(matches!(
            ConditionalForecaster::forecast(&model, &[25.0], 0, &config),
            Err(ForecastError::InvalidHorizon { .. })
        ));
        assert!(matches!(
            ConditionalForecaster::forecast(&model, &[25.0], MAX_HORIZON + 1, &config),
            Err(ForecastError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn test_non_finite_shock_rejected() {
        let model = fitted_model();
        let result = ConditionalForecaster::forecast(
            &model,
            &[f64::NAN],
            2,
            &MonteCarloConfig::default(),
        );
        assert!(matches!(result, Err(ForecastError::InvalidInput { .. })));
    }

    #[test]
    fn test_path_lookup() {
        let model = fitted_model();
        let path =
            ConditionalForecaster::forecast(&model, &[25.0], 5, &MonteCarloConfig::default())
                .unwrap();
        assert!(path.at(3).is_some());
        assert!(path.at(9).is_none());
        assert_eq!(path.last().horizon, 5);
    }
}
