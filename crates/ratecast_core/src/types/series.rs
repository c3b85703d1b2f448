//! Event-driven rate points and the aligned monthly series.
//!
//! The forecasting engine works on a two-variable system: a foreign policy
//! rate ("shock") and a domestic policy rate ("response"). Raw inputs are
//! event-driven decision histories; [`AlignedSeries`] is the synchronized
//! monthly representation both estimators consume.

use chrono::{Datelike, NaiveDate};
use nalgebra::DMatrix;

use super::error::AlignmentError;
use crate::math::stats::sample_variance;

/// Number of variables in the system: shock first, response second.
///
/// The ordering is load-bearing: structural identification places the shock
/// variable first in the Cholesky ordering.
pub const N_VARS: usize = 2;

/// Floor applied to empirical variances before they enter prior scaling.
pub const VARIANCE_FLOOR: f64 = 1e-6;

/// A single observation of a policy rate level.
///
/// `rate` is the level in basis points; month-over-month first differences
/// of forward-filled levels become the move series the estimators see.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatePoint {
    /// Decision or observation date.
    pub date: NaiveDate,
    /// Rate level in basis points.
    pub rate: f64,
}

impl RatePoint {
    /// Creates a new rate point.
    #[inline]
    pub fn new(date: NaiveDate, rate: f64) -> Self {
        Self { date, rate }
    }
}

/// Empirical variance scale of the aligned move series.
///
/// Used by the Minnesota prior to put cross-variable coefficients on a
/// comparable footing, and persisted in snapshots for audit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaleInfo {
    /// Sample variance of the shock move series, floored at [`VARIANCE_FLOOR`].
    pub shock_variance: f64,
    /// Sample variance of the response move series, floored at [`VARIANCE_FLOOR`].
    pub response_variance: f64,
}

impl ScaleInfo {
    /// Computes the variance scale of an aligned series.
    pub fn from_series(series: &AlignedSeries) -> Self {
        Self {
            shock_variance: sample_variance(series.shock()).max(VARIANCE_FLOOR),
            response_variance: sample_variance(series.response()).max(VARIANCE_FLOOR),
        }
    }

    /// Variance of variable `index` (0 = shock, 1 = response).
    ///
    /// # Panics
    ///
    /// Panics if `index >= N_VARS`; callers index by construction.
    #[inline]
    pub fn variance(&self, index: usize) -> f64 {
        match index {
            0 => self.shock_variance,
            1 => self.response_variance,
            _ => panic!("variable index {} out of range", index),
        }
    }
}

/// Synchronized monthly (shock, response) move pairs.
///
/// Invariants, enforced at construction:
/// - shock and response vectors have equal length
/// - months are strictly increasing with no gaps (consecutive calendar
///   months, normalized to the first of the month)
/// - all values are finite
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ratecast_core::AlignedSeries;
///
/// let months: Vec<NaiveDate> = (1..=4)
///     .map(|m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap())
///     .collect();
/// let series = AlignedSeries::new(months, vec![25.0, 0.0, -25.0, 0.0], vec![0.0, 25.0, 0.0, 0.0])
///     .unwrap();
/// assert_eq!(series.len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignedSeries {
    months: Vec<NaiveDate>,
    shock: Vec<f64>,
    response: Vec<f64>,
}

impl AlignedSeries {
    /// Constructs an aligned series, validating every invariant.
    ///
    /// # Errors
    ///
    /// Returns [`AlignmentError::InvariantViolated`] on length mismatch,
    /// non-consecutive months, or non-finite values.
    pub fn new(
        months: Vec<NaiveDate>,
        shock: Vec<f64>,
        response: Vec<f64>,
    ) -> Result<Self, AlignmentError> {
        if months.len() != shock.len() || months.len() != response.len() {
            return Err(AlignmentError::InvariantViolated {
                detail: format!(
                    "length mismatch: {} months, {} shock, {} response",
                    months.len(),
                    shock.len(),
                    response.len()
                ),
            });
        }
        if months.is_empty() {
            return Err(AlignmentError::InvariantViolated {
                detail: "aligned series is empty".to_string(),
            });
        }
        for window in months.windows(2) {
            let expected = next_month(window[0]);
            if window[1] != expected {
                return Err(AlignmentError::InvariantViolated {
                    detail: format!(
                        "months not consecutive: {} followed by {}",
                        window[0], window[1]
                    ),
                });
            }
        }
        if shock
            .iter()
            .chain(response.iter())
            .any(|v| !v.is_finite())
        {
            return Err(AlignmentError::InvariantViolated {
                detail: "non-finite move value".to_string(),
            });
        }
        Ok(Self {
            months,
            shock,
            response,
        })
    }

    /// Number of aligned monthly observations.
    #[inline]
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// True when the series holds no observations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// The month grid (first-of-month dates).
    #[inline]
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    /// Shock move series in basis points.
    #[inline]
    pub fn shock(&self) -> &[f64] {
        &self.shock
    }

    /// Response move series in basis points.
    #[inline]
    pub fn response(&self) -> &[f64] {
        &self.response
    }

    /// Observation at index `t` as `[shock, response]`.
    #[inline]
    pub fn observation(&self, t: usize) -> [f64; N_VARS] {
        [self.shock[t], self.response[t]]
    }

    /// First and last month of the training window.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.months[0], self.months[self.months.len() - 1])
    }

    /// Builds lagged VAR design matrices for lag order `p`.
    ///
    /// Row `t` of X (for `t` in `p..n`) is
    /// `[1, shock_{t-1}, response_{t-1}, ..., shock_{t-p}, response_{t-p}]`
    /// and the matching row of Y is `[shock_t, response_t]`. X is therefore
    /// `(n - p) x (1 + N_VARS * p)` and Y is `(n - p) x N_VARS`.
    ///
    /// # Errors
    ///
    /// Returns [`AlignmentError::SampleTooSmall`] when fewer than two design
    /// rows would remain.
    pub fn design_matrices(&self, p: usize) -> Result<(DMatrix<f64>, DMatrix<f64>), AlignmentError> {
        let n = self.len();
        let required = p + 2;
        if n < required {
            return Err(AlignmentError::SampleTooSmall {
                required,
                provided: n,
            });
        }
        let rows = n - p;
        let cols = 1 + N_VARS * p;

        let mut x = DMatrix::<f64>::zeros(rows, cols);
        let mut y = DMatrix::<f64>::zeros(rows, N_VARS);
        for (row, t) in (p..n).enumerate() {
            x[(row, 0)] = 1.0;
            for lag in 1..=p {
                let obs = self.observation(t - lag);
                let base = 1 + (lag - 1) * N_VARS;
                x[(row, base)] = obs[0];
                x[(row, base + 1)] = obs[1];
            }
            y[(row, 0)] = self.shock[t];
            y[(row, 1)] = self.response[t];
        }
        Ok((x, y))
    }

    /// Stable 64-bit FNV-1a fingerprint of the aligned data.
    ///
    /// Embedded in snapshots so a loaded artifact can be traced back to the
    /// exact training window that produced it.
    pub fn fingerprint(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        let mut mix = |bytes: &[u8]| {
            for &b in bytes {
                hash ^= u64::from(b);
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        };
        for (i, month) in self.months.iter().enumerate() {
            mix(&month.year().to_le_bytes());
            mix(&month.month().to_le_bytes());
            mix(&self.shock[i].to_bits().to_le_bytes());
            mix(&self.response[i].to_bits().to_le_bytes());
        }
        hash
    }
}

/// First day of the month following `date`.
pub(crate) fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // Day 1 of a valid (year, month) always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// First day of the month containing `date`.
pub(crate) fn month_floor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}
