//! Engine selection and response assembly.
//!
//! The orchestrator owns one fitted BVAR and one fitted local-projections
//! set, selects between them per request, and assembles the full
//! prediction report: discretized distribution, calendar allocation,
//! uncertainty bands, and rationale text. Fit-time advisories are retained
//! and folded into every rationale so a caveated model never presents
//! itself as clean.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ratecast_core::math::stats::round_to_step;
use ratecast_core::{Advisory, AlignedSeries, Outcome};
use ratecast_models::lp::BootstrapConfig;
use ratecast_models::{
    BvarConfig, EstimationError, FittedBvar, LocalProjectionsEstimator, LpConfig, LpModelSet,
};

use crate::distribution::{
    CalendarAllocation, CalendarMapper, DecayProfile, DiscretizationConfig, DiscretizationEngine,
    DistributionPoint,
};
use crate::error::ForecastError;
use crate::mc::{ConditionalForecaster, MonteCarloConfig};

/// Which estimator serves a prediction request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineKind {
    /// Monte-Carlo conditional forecast from the fitted BVAR.
    Bvar,
    /// Horizon IRF from the fitted local projections.
    LocalProjections,
}

/// Complete configuration for the dual-engine forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecasterConfig {
    /// BVAR estimation settings.
    pub bvar: BvarConfig,
    /// Local-projections estimation settings.
    pub lp: LpConfig,
    /// Bootstrap settings for LP confidence intervals.
    pub bootstrap: BootstrapConfig,
    /// Monte-Carlo forecast settings.
    pub monte_carlo: MonteCarloConfig,
    /// Discretization settings.
    pub discretization: DiscretizationConfig,
    /// Calendar decay calibration.
    pub decay: DecayProfile,
}

impl ForecasterConfig {
    /// Validates every component configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ratecast_core::ConfigurationError`] found.
    pub fn validate(&self) -> Result<(), ratecast_core::ConfigurationError> {
        self.bvar.validate()?;
        self.lp.validate()?;
        self.bootstrap.validate()?;
        self.monte_carlo.validate()?;
        self.discretization.validate()?;
        self.decay.validate()?;
        Ok(())
    }
}

/// A prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Which estimator to use.
    pub engine: EngineKind,
    /// Imposed foreign shock path in basis points, `shock_path[h-1]` for
    /// horizon `h`.
    pub shock_path: Vec<f64>,
    /// Target horizon in months.
    pub horizon: usize,
    /// Upcoming scheduled decision dates (may be empty; calendar output is
    /// then empty as well).
    pub meetings: Vec<NaiveDate>,
}

/// The assembled prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Engine that produced the forecast.
    pub engine: EngineKind,
    /// Expected move at the target horizon, rounded to the decision grid.
    pub expected_move_bps: f64,
    /// Human-readable horizon, e.g. `"4m"`.
    pub horizon_label: String,
    /// Probability mass allocated to the next scheduled meeting.
    pub probability_of_move_by_next_meeting: f64,
    /// 10th/90th percentile band in basis points.
    pub ci80_bps: (f64, f64),
    /// 2.5th/97.5th percentile band in basis points.
    pub ci95_bps: (f64, f64),
    /// Per-meeting probability allocation.
    pub per_meeting: Vec<CalendarAllocation>,
    /// Discretized outcome distribution at the target horizon.
    pub distribution: Vec<DistributionPoint>,
    /// Narrative summary including any caveats.
    pub rationale_text: String,
}

/// Model diagnostics for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// In-sample R² of the BVAR response equation.
    pub r_squared: f64,
    /// Companion-matrix stability flag.
    pub stable: bool,
    /// Condition number of the residual covariance.
    pub condition_number: f64,
    /// Months after the shock at which the structural response peaks.
    pub irf_peak_horizon: usize,
    /// Unit-shock response path of the response variable, horizon 0
    /// onwards.
    pub irf_response_path: Vec<f64>,
    /// Mean R² across fitted LP horizons.
    pub lp_mean_r_squared: f64,
    /// Number of fitted LP horizons.
    pub lp_horizon_count: usize,
}

/// The dual-engine forecaster.
///
/// Fitting requires exclusive ownership and is synchronous; the fitted
/// value is immutable, and `predict`/`evaluate` are `&self` and safe to
/// call from many threads concurrently — each prediction owns its RNG.
#[derive(Debug, Clone)]
pub struct RateForecaster {
    config: ForecasterConfig,
    bvar: FittedBvar,
    lp: LpModelSet,
    fit_advisories: Vec<Advisory>,
}

impl RateForecaster {
    /// Fits both engines on an aligned series.
    ///
    /// Advisories from either engine (thin sample, instability, skipped
    /// horizons) are combined on the returned outcome and retained for
    /// rationale text.
    ///
    /// # Errors
    ///
    /// Any [`EstimationError`] aborts the whole fit; there is no partial
    /// success across engines.
    pub fn fit(
        config: ForecasterConfig,
        series: &AlignedSeries,
    ) -> Result<Outcome<RateForecaster>, EstimationError> {
        config.validate()?;

        info!(
            n_obs = series.len(),
            lag_order = config.bvar.lag_order,
            "fitting dual-engine forecaster"
        );

        let (bvar, mut advisories) = FittedBvar::fit(config.bvar, series)?.into_parts();
        let (lp, lp_advisories) =
            LocalProjectionsEstimator::fit_with_ci(config.lp, &config.bootstrap, series)?
                .into_parts();
        advisories.extend(lp_advisories);

        for advisory in &advisories {
            warn!(%advisory, "fit advisory");
        }

        let forecaster = RateForecaster {
            config,
            bvar,
            lp,
            fit_advisories: advisories.clone(),
        };
        Ok(Outcome::new(forecaster, advisories))
    }

    /// Reassembles a forecaster from already-fitted parts (snapshot load).
    pub(crate) fn from_fitted(
        config: ForecasterConfig,
        bvar: FittedBvar,
        lp: LpModelSet,
    ) -> RateForecaster {
        let mut fit_advisories = Vec::new();
        let verdict = bvar.verdict();
        if !verdict.stable {
            fit_advisories.push(Advisory::Unstable {
                max_modulus: verdict.max_modulus,
            });
        }
        RateForecaster {
            config,
            bvar,
            lp,
            fit_advisories,
        }
    }

    /// Full configuration.
    #[inline]
    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    /// The fitted BVAR.
    #[inline]
    pub fn bvar(&self) -> &FittedBvar {
        &self.bvar
    }

    /// The fitted local-projections set.
    #[inline]
    pub fn lp(&self) -> &LpModelSet {
        &self.lp
    }

    /// Advisories retained from fit time.
    #[inline]
    pub fn advisories(&self) -> &[Advisory] {
        &self.fit_advisories
    }

    /// Produces a full prediction for one request.
    ///
    /// # Errors
    ///
    /// Inference failures (bad horizon, missing LP model, degenerate
    /// covariance) surface to the caller; nothing is replaced with a
    /// default.
    pub fn predict(&self, request: &PredictRequest) -> Result<PredictionReport, ForecastError> {
        let (mean, std, ci80, ci95, peak_horizon) = match request.engine {
            EngineKind::Bvar => self.bvar_target(request)?,
            EngineKind::LocalProjections => self.lp_target(request)?,
        };

        let (distribution, discretize_advisories) =
            DiscretizationEngine::discretize(mean, std, ci95, &self.config.discretization)?
                .into_parts();

        let hold_probability = distribution
            .iter()
            .find(|p| p.delta_bps.abs() < 1e-9)
            .map(|p| p.probability)
            .unwrap_or(0.0);
        let move_probability = (1.0 - hold_probability).clamp(0.0, 1.0);

        let expected_move_bps = round_to_step(mean, self.config.discretization.step_bps);
        let decay = self.config.decay.decay_for_peak(peak_horizon);

        let per_meeting = if request.meetings.is_empty() {
            Vec::new()
        } else {
            CalendarMapper::allocate(
                &request.meetings,
                move_probability,
                expected_move_bps,
                decay,
            )?
        };
        let probability_of_move_by_next_meeting =
            per_meeting.first().map(|a| a.probability).unwrap_or(0.0);

        let mut advisories = self.fit_advisories.clone();
        advisories.extend(discretize_advisories);
        let rationale_text = build_rationale(
            request.engine,
            request.horizon,
            expected_move_bps,
            mean,
            move_probability,
            peak_horizon,
            per_meeting.len(),
            &advisories,
        );

        info!(
            engine = ?request.engine,
            horizon = request.horizon,
            expected_move_bps,
            move_probability,
            "prediction assembled"
        );

        Ok(PredictionReport {
            engine: request.engine,
            expected_move_bps,
            horizon_label: format!("{}m", request.horizon),
            probability_of_move_by_next_meeting,
            ci80_bps: ci80,
            ci95_bps: ci95,
            per_meeting,
            distribution,
            rationale_text,
        })
    }

    /// Model diagnostics.
    pub fn evaluate(&self) -> EvaluationReport {
        let verdict = self.bvar.verdict();
        EvaluationReport {
            r_squared: self.bvar.response_r_squared(),
            stable: verdict.stable,
            condition_number: self.bvar.posterior().condition_number(),
            irf_peak_horizon: self.bvar.irf().peak_response_horizon(),
            irf_response_path: self.bvar.irf().response_path(),
            lp_mean_r_squared: self.lp.mean_r_squared(),
            lp_horizon_count: self.lp.len(),
        }
    }

    /// Runs the BVAR conditional forecast and extracts the target horizon.
    #[allow(clippy::type_complexity)]
    fn bvar_target(
        &self,
        request: &PredictRequest,
    ) -> Result<(f64, f64, (f64, f64), (f64, f64), usize), ForecastError> {
        let path = ConditionalForecaster::forecast(
            &self.bvar,
            &request.shock_path,
            request.horizon,
            &self.config.monte_carlo,
        )?;
        let target = path.at(request.horizon).ok_or(ForecastError::InvalidHorizon {
            horizon: request.horizon,
            max: crate::mc::config::MAX_HORIZON,
        })?;
        Ok((
            target.mean,
            target.std,
            target.ci80,
            target.ci95,
            self.bvar.irf().peak_response_horizon(),
        ))
    }

    /// Scales the fitted LP horizon coefficient by the requested shock.
    #[allow(clippy::type_complexity)]
    fn lp_target(
        &self,
        request: &PredictRequest,
    ) -> Result<(f64, f64, (f64, f64), (f64, f64), usize), ForecastError> {
        let model = self
            .lp
            .horizon(request.horizon)
            .ok_or(ForecastError::HorizonUnavailable {
                horizon: request.horizon,
            })?;
        let shock = request
            .shock_path
            .first()
            .copied()
            .ok_or(ForecastError::EmptyShockPath)?;
        if !shock.is_finite() {
            return Err(ForecastError::invalid_input("non-finite imposed shock"));
        }

        let (ci_lo, ci_hi) = model.ci95.ok_or_else(|| {
            ForecastError::invalid_input(format!(
                "no bootstrap interval for horizon {}",
                request.horizon
            ))
        })?;

        let mean = model.shock_coefficient * shock;
        let a = ci_lo * shock;
        let b = ci_hi * shock;
        let ci95 = (a.min(b), a.max(b));
        // Bootstrap percentiles are the sole LP uncertainty; the narrower
        // band is derived from the same interval width.
        let std = (ci95.1 - ci95.0) / (2.0 * 1.96);
        let ci80 = (mean - 1.282 * std, mean + 1.282 * std);

        Ok((mean, std, ci80, ci95, self.lp.peak_response_horizon()))
    }
}

#[allow(clippy::too_many_arguments)]
fn build_rationale(
    engine: EngineKind,
    horizon: usize,
    expected_move_bps: f64,
    raw_mean: f64,
    move_probability: f64,
    peak_horizon: usize,
    n_meetings: usize,
    advisories: &[Advisory],
) -> String {
    let engine_name = match engine {
        EngineKind::Bvar => "BVAR conditional forecast",
        EngineKind::LocalProjections => "local-projections estimate",
    };
    let mut text = format!(
        "{}: expected response of {:+.0} bps over {} months (model mean {:+.1} bps). \
         Response peaks {} month(s) after the shock; {:.0}% probability of a move",
        engine_name,
        expected_move_bps,
        horizon,
        raw_mean,
        peak_horizon,
        move_probability * 100.0,
    );
    if n_meetings > 0 {
        text.push_str(&format!(", allocated across {} scheduled decision(s)", n_meetings));
    }
    text.push('.');
    for advisory in advisories {
        text.push_str(&format!(" Caveat: {}.", advisory));
    }
    text
}
