//! Geometric-decay allocation across decision dates.
//!
//! The discretized table answers "how far does the rate move"; the calendar
//! mapper answers "when". The aggregate non-zero-move probability is
//! spread across the next N scheduled meetings with geometric weights
//! `(1−d)·dⁱ`, renormalized so the meeting probabilities sum exactly to the
//! aggregate. The decay is selected by where the impulse response peaks —
//! a calibration heuristic with tunable thresholds, not a derived optimum.
//! The same expected delta is attached to every meeting: magnitude is not
//! varied per meeting, only probability mass.

use chrono::NaiveDate;
use ratecast_core::ConfigurationError;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Decay selection by peak-response horizon.
///
/// Defaults reproduce the hand-tuned calibration: d = 0.60 when the
/// response peaks within 2 months, 0.55 within 4, 0.45 beyond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayProfile {
    /// Decay when the peak horizon is at most `fast_cutoff_months`.
    pub fast: f64,
    /// Decay when the peak horizon is at most `mid_cutoff_months`.
    pub mid: f64,
    /// Decay for later peaks.
    pub slow: f64,
    /// Upper bound (inclusive, months) for the fast regime.
    pub fast_cutoff_months: usize,
    /// Upper bound (inclusive, months) for the mid regime.
    pub mid_cutoff_months: usize,
}

impl Default for DecayProfile {
    fn default() -> Self {
        Self {
            fast: 0.60,
            mid: 0.55,
            slow: 0.45,
            fast_cutoff_months: 2,
            mid_cutoff_months: 4,
        }
    }
}

impl DecayProfile {
    /// Validates the profile.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a decay lies outside `(0, 1)` or
    /// the cutoffs are not increasing.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [("fast", self.fast), ("mid", self.mid), ("slow", self.slow)] {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(ConfigurationError::InvalidHyperparameter {
                    name,
                    value,
                    reason: "decay must lie strictly inside (0, 1)",
                });
            }
        }
        if self.fast_cutoff_months >= self.mid_cutoff_months {
            return Err(ConfigurationError::InvalidParameter {
                name: "mid_cutoff_months",
                detail: "cutoffs must be strictly increasing".to_string(),
            });
        }
        Ok(())
    }

    /// The decay for a detected peak-response horizon (in months).
    pub fn decay_for_peak(&self, peak_horizon_months: usize) -> f64 {
        if peak_horizon_months <= self.fast_cutoff_months {
            self.fast
        } else if peak_horizon_months <= self.mid_cutoff_months {
            self.mid
        } else {
            self.slow
        }
    }
}

/// Probability mass assigned to one scheduled decision date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarAllocation {
    /// Meeting date.
    pub date: NaiveDate,
    /// Expected move in basis points (identical across meetings).
    pub delta_bps: f64,
    /// Probability that the move lands at this meeting.
    pub probability: f64,
}

/// Distributes aggregate move probability across upcoming meetings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarMapper;

impl CalendarMapper {
    /// Allocates `aggregate_probability` across `meetings` with geometric
    /// decay `decay`.
    ///
    /// The meeting probabilities sum exactly to the aggregate for any
    /// number of meetings and any decay in `(0, 1)`.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::InvalidInput`] on an empty calendar or a
    ///   probability outside `[0, 1]`
    /// - [`ForecastError::Configuration`] on a decay outside `(0, 1)`
    pub fn allocate(
        meetings: &[NaiveDate],
        aggregate_probability: f64,
        expected_delta_bps: f64,
        decay: f64,
    ) -> Result<Vec<CalendarAllocation>, ForecastError> {
        if meetings.is_empty() {
            return Err(ForecastError::invalid_input("empty decision calendar"));
        }
        if !aggregate_probability.is_finite() || !(0.0..=1.0).contains(&aggregate_probability) {
            return Err(ForecastError::invalid_input(
                "aggregate probability must lie in [0, 1]",
            ));
        }
        if !decay.is_finite() || decay <= 0.0 || decay >= 1.0 {
            return Err(ConfigurationError::InvalidHyperparameter {
                name: "decay",
                value: decay,
                reason: "must lie strictly inside (0, 1)",
            }
            .into());
        }

        let weights: Vec<f64> = (0..meetings.len())
            .map(|i| (1.0 - decay) * decay.powi(i as i32))
            .collect();
        let total: f64 = weights.iter().sum();

        Ok(meetings
            .iter()
            .zip(weights)
            .map(|(&date, w)| CalendarAllocation {
                date,
                delta_bps: expected_delta_bps,
                probability: w / total * aggregate_probability,
            })
            .collect())
    }
}
