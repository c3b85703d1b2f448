//! Discretization of a forecast density onto the decision grid.
//!
//! Policy rates move in 25-bp steps, so the continuous forecast density is
//! collapsed into bin masses on a 25-bp grid spanning the confidence range.
//! Bin masses are computed analytically from the normal CDF — never by
//! re-sampling — so the published table is deterministic and carries no
//! compounded simulation noise.

use ratecast_core::math::normal::norm_cdf;
use ratecast_core::math::stats::round_to_step;
use ratecast_core::{Advisory, ConfigurationError, Outcome};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Discretization configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscretizationConfig {
    /// Width of one outcome bin in basis points.
    pub step_bps: f64,
    /// Bins below this probability are dropped before renormalization.
    pub min_probability: f64,
    /// Relative deviation between the reported std and the CI-implied std
    /// above which the CI-implied value wins.
    pub std_tolerance: f64,
}

impl Default for DiscretizationConfig {
    fn default() -> Self {
        Self {
            step_bps: 25.0,
            min_probability: 0.005,
            std_tolerance: 0.20,
        }
    }
}

impl DiscretizationConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] on a non-positive step, a
    /// non-positive tolerance, or a drop threshold outside `[0, 1)`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.step_bps.is_finite() || self.step_bps <= 0.0 {
            return Err(ConfigurationError::InvalidHyperparameter {
                name: "step_bps",
                value: self.step_bps,
                reason: "must be positive and finite",
            });
        }
        if !self.min_probability.is_finite() || !(0.0..1.0).contains(&self.min_probability) {
            return Err(ConfigurationError::InvalidHyperparameter {
                name: "min_probability",
                value: self.min_probability,
                reason: "must lie in [0, 1)",
            });
        }
        if !self.std_tolerance.is_finite() || self.std_tolerance <= 0.0 {
            return Err(ConfigurationError::InvalidHyperparameter {
                name: "std_tolerance",
                value: self.std_tolerance,
                reason: "must be positive and finite",
            });
        }
        Ok(())
    }
}

/// One discretized outcome: a grid-aligned move and its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionPoint {
    /// Move in basis points (a multiple of the configured step).
    pub delta_bps: f64,
    /// Probability mass; the full set sums to 1.0 after normalization.
    pub probability: f64,
}

/// Converts forecast moments into a normalized outcome table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscretizationEngine;

impl DiscretizationEngine {
    /// Discretizes `(mean, std, ci95)` into grid-aligned probabilities.
    ///
    /// Consistency check first: the std implied by the CI width,
    /// `(ci_hi − ci_lo) / (2·1.96)`, overrides the reported std when the
    /// two deviate by more than the configured tolerance (the override is
    /// reported as an advisory). Candidate outcomes span the CI range on
    /// the step grid; each bin receives
    /// `Φ((v+s/2−mean)/σ) − Φ((v−s/2−mean)/σ)`, sub-threshold bins are
    /// dropped, and the survivors are renormalized to sum to exactly one.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::Configuration`] on invalid configuration
    /// - [`ForecastError::InvalidInput`] on non-finite inputs or an
    ///   inverted interval
    pub fn discretize(
        mean: f64,
        std: f64,
        ci95: (f64, f64),
        config: &DiscretizationConfig,
    ) -> Result<Outcome<Vec<DistributionPoint>>, ForecastError> {
        config.validate()?;
        let (ci_lo, ci_hi) = ci95;
        if !mean.is_finite() || !std.is_finite() || !ci_lo.is_finite() || !ci_hi.is_finite() {
            return Err(ForecastError::invalid_input(
                "non-finite discretization input",
            ));
        }
        if ci_lo > ci_hi {
            return Err(ForecastError::invalid_input(
                "confidence interval bounds are inverted",
            ));
        }

        let mut advisories = Vec::new();
        let std_from_ci = (ci_hi - ci_lo) / (2.0 * 1.96);
        let effective_std = if std <= 0.0 {
            std_from_ci
        } else if std_from_ci > 0.0 && ((std_from_ci - std) / std).abs() > config.std_tolerance {
            advisories.push(Advisory::StdOverridden {
                reported: std,
                implied: std_from_ci,
            });
            std_from_ci
        } else {
            std
        };

        // Degenerate density: all mass on the nearest grid point.
        if effective_std <= 0.0 {
            let point = DistributionPoint {
                delta_bps: round_to_step(mean, config.step_bps),
                probability: 1.0,
            };
            return Ok(Outcome::new(vec![point], advisories));
        }

        let step = config.step_bps;
        let half = step / 2.0;
        let lo_bin = (ci_lo / step).floor() * step;
        let hi_bin = (ci_hi / step).ceil() * step;

        let mut points = Vec::new();
        let mut value = lo_bin;
        while value <= hi_bin + 1e-9 {
            let upper = norm_cdf((value + half - mean) / effective_std);
            let lower = norm_cdf((value - half - mean) / effective_std);
            let mass = upper - lower;
            if mass >= config.min_probability {
                points.push(DistributionPoint {
                    delta_bps: value,
                    probability: mass,
                });
            }
            value += step;
        }

        if points.is_empty() {
            // Every bin fell under the threshold (extremely wide CI against
            // a tight density); keep the grid point nearest the mean.
            points.push(DistributionPoint {
                delta_bps: round_to_step(mean, step),
                probability: 1.0,
            });
        } else {
            let total: f64 = points.iter().map(|p| p.probability).sum();
            for point in &mut points {
                point.probability /= total;
            }
        }

        Ok(Outcome::new(points, advisories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sum(points: &[DistributionPoint]) -> f64 {
        points.iter().map(|p| p.probability).sum()
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let config = DiscretizationConfig::default();
        let outcome =
            DiscretizationEngine::discretize(12.0, 18.0, (-23.3, 47.3), &config).unwrap();
        let points = outcome.into_value();
        assert_relative_eq!(sum(&points), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sum_to_one_across_inputs() {
        let config = DiscretizationConfig::default();
        for (mean, std) in [(0.0, 5.0), (-40.0, 30.0), (7.5, 12.0), (100.0, 60.0)] {
            let ci = (mean - 1.96 * std, mean + 1.96 * std);
            let points = DiscretizationEngine::discretize(mean, std, ci, &config)
                .unwrap()
                .into_value();
            assert_relative_eq!(sum(&points), 1.0, epsilon = 1e-9);
            for p in &points {
                assert!(p.probability >= 0.0);
                // Grid alignment.
                assert_relative_eq!(
                    p.delta_bps,
                    round_to_step(p.delta_bps, config.step_bps),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_mass_concentrates_near_mean() {
        let config = DiscretizationConfig::default();
        let points = DiscretizationEngine::discretize(25.0, 10.0, (5.4, 44.6), &config)
            .unwrap()
            .into_value();
        let peak = points
            .iter()
            .max_by(|a, b| a.probability.partial_cmp(&b.probability).unwrap())
            .unwrap();
        assert_eq!(peak.delta_bps, 25.0);
    }

    #[test]
    fn test_std_override_triggers_above_tolerance() {
        let config = DiscretizationConfig::default();
        // CI width implies std = 10; reported std deviates by 50%.
        let ci = (-19.6, 19.6);
        let outcome = DiscretizationEngine::discretize(0.0, 15.0, ci, &config).unwrap();
        assert!(outcome
            .advisories()
            .iter()
            .any(|a| matches!(a, Advisory::StdOverridden { .. })));
    }

    #[test]
    fn test_std_override_skipped_within_tolerance() {
        let config = DiscretizationConfig::default();
        // Implied std = 10, reported 10.5: inside 20% tolerance.
        let outcome =
            DiscretizationEngine::discretize(0.0, 10.5, (-19.6, 19.6), &config).unwrap();
        assert!(outcome.is_clean());
    }

    #[test]
    fn test_boundary_of_override() {
        let config = DiscretizationConfig::default();
        // Implied std exactly (ci_hi - ci_lo)/3.92 = 10. Reported 12.5 is a
        // 20% deviation — not strictly greater, so no override; 12.6 is.
        let at_boundary =
            DiscretizationEngine::discretize(0.0, 12.5, (-19.6, 19.6), &config).unwrap();
        assert!(at_boundary.is_clean());

        let past_boundary =
            DiscretizationEngine::discretize(0.0, 12.6, (-19.6, 19.6), &config).unwrap();
        assert!(!past_boundary.is_clean());
    }

    #[test]
    fn test_degenerate_std_yields_point_mass() {
        let config = DiscretizationConfig::default();
        let points = DiscretizationEngine::discretize(26.0, 0.0, (26.0, 26.0), &config)
            .unwrap()
            .into_value();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].delta_bps, 25.0);
        assert_eq!(points[0].probability, 1.0);
    }

    #[test]
    fn test_small_bins_dropped() {
        let config = DiscretizationConfig {
            min_probability: 0.05,
            ..Default::default()
        };
        let points = DiscretizationEngine::discretize(0.0, 10.0, (-19.6, 19.6), &config)
            .unwrap()
            .into_value();
        // Tails below 5% are gone, and the survivors renormalize to one.
        assert_relative_eq!(sum(&points), 1.0, epsilon = 1e-9);
        assert!(points.len() <= 3);
    }

    #[test]
    fn test_inverted_interval_rejected() {
        let config = DiscretizationConfig::default();
        let result = DiscretizationEngine::discretize(0.0, 10.0, (5.0, -5.0), &config);
        assert!(matches!(result, Err(ForecastError::InvalidInput { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DiscretizationConfig {
            step_bps: 0.0,
            ..Default::default()
        };
        let result = DiscretizationEngine::discretize(0.0, 10.0, (-5.0, 5.0), &config);
        assert!(matches!(result, Err(ForecastError::Configuration(_))));
    }
}
