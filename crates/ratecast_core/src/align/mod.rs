//! Alignment of event-driven rate histories onto a common monthly grid.
//!
//! Policy decisions arrive on irregular calendars. The estimators want a
//! regular design, so alignment forward-fills each rate level onto a
//! month-start grid covering the overlap of the two series and then takes
//! month-over-month first differences as the move series.

use chrono::NaiveDate;

use crate::types::series::{month_floor, next_month};
use crate::types::{AlignedSeries, AlignmentError, RatePoint};

/// Aligns two event-driven level series onto a shared monthly move grid.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use ratecast_core::{MonthlyAligner, RatePoint};
///
/// let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
/// let shock = vec![
///     RatePoint::new(d(2024, 1, 15), 500.0),
///     RatePoint::new(d(2024, 3, 20), 525.0),
///     RatePoint::new(d(2024, 6, 12), 525.0),
/// ];
/// let response = vec![
///     RatePoint::new(d(2024, 1, 31), 400.0),
///     RatePoint::new(d(2024, 4, 10), 425.0),
///     RatePoint::new(d(2024, 6, 25), 450.0),
/// ];
///
/// let series = MonthlyAligner::align(&shock, &response).unwrap();
/// // Grid spans Feb..=Jun; five months of levels give five moves
/// // (the first move is measured against the January level).
/// assert_eq!(series.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyAligner;

impl MonthlyAligner {
    /// Aligns `shock` and `response` level histories into an [`AlignedSeries`].
    ///
    /// Levels are forward-filled onto a first-of-month grid spanning the
    /// overlap of the two series; consecutive filled levels are differenced
    /// into basis-point moves.
    ///
    /// # Errors
    ///
    /// - [`AlignmentError::EmptySeries`] if either input is empty
    /// - [`AlignmentError::UnorderedDates`] if either input is not strictly
    ///   increasing in date
    /// - [`AlignmentError::NoOverlap`] if the series share no months
    /// - [`AlignmentError::SampleTooSmall`] if fewer than one move remains
    pub fn align(
        shock: &[RatePoint],
        response: &[RatePoint],
    ) -> Result<AlignedSeries, AlignmentError> {
        validate_events(shock, "shock")?;
        validate_events(response, "response")?;

        let start = month_floor(shock[0].date).max(month_floor(response[0].date));
        let end = month_floor(shock[shock.len() - 1].date)
            .min(month_floor(response[response.len() - 1].date));
        if start > end {
            return Err(AlignmentError::NoOverlap);
        }

        let mut months = Vec::new();
        let mut cursor = start;
        while cursor <= end {
            months.push(cursor);
            cursor = next_month(cursor);
        }
        if months.len() < 2 {
            return Err(AlignmentError::SampleTooSmall {
                required: 2,
                provided: months.len(),
            });
        }

        let shock_levels = forward_fill(shock, &months);
        let response_levels = forward_fill(response, &months);

        let move_months = months[1..].to_vec();
        let shock_moves = first_differences(&shock_levels);
        let response_moves = first_differences(&response_levels);

        AlignedSeries::new(move_months, shock_moves, response_moves)
    }
}

fn validate_events(events: &[RatePoint], name: &'static str) -> Result<(), AlignmentError> {
    if events.is_empty() {
        return Err(AlignmentError::EmptySeries { name });
    }
    for (index, window) in events.windows(2).enumerate() {
        if window[1].date <= window[0].date {
            return Err(AlignmentError::UnorderedDates {
                name,
                index: index + 1,
            });
        }
    }
    Ok(())
}

/// Level as of each grid month: the latest event dated in or before it.
///
/// The grid starts no earlier than the series' first event month, so the
/// carry value is always initialized before first use.
fn forward_fill(events: &[RatePoint], months: &[NaiveDate]) -> Vec<f64> {
    let mut filled = Vec::with_capacity(months.len());
    let mut idx = 0;
    let mut carry = events[0].rate;
    for &month in months {
        while idx < events.len() && month_floor(events[idx].date) <= month {
            carry = events[idx].rate;
            idx += 1;
        }
        filled.push(carry);
    }
    filled
}

fn first_differences(levels: &[f64]) -> Vec<f64> {
    levels.windows(2).map(|w| w[1] - w[0]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_align_forward_fills_quiet_months() {
        let shock = vec![
            RatePoint::new(d(2024, 1, 10), 500.0),
            RatePoint::new(d(2024, 4, 10), 550.0),
        ];
        let response = vec![
            RatePoint::new(d(2024, 1, 20), 400.0),
            RatePoint::new(d(2024, 4, 20), 425.0),
        ];

        let series = MonthlyAligner::align(&shock, &response).unwrap();
        // Grid Jan..=Apr, moves for Feb, Mar, Apr.
        assert_eq!(series.len(), 3);
        assert_eq!(series.shock(), &[0.0, 0.0, 50.0]);
        assert_eq!(series.response(), &[0.0, 0.0, 25.0]);
        assert_eq!(series.months()[0], d(2024, 2, 1));
    }

    #[test]
    fn test_align_trims_to_overlap() {
        let shock = vec![
            RatePoint::new(d(2023, 6, 1), 100.0),
            RatePoint::new(d(2024, 6, 1), 200.0),
        ];
        let response = vec![
            RatePoint::new(d(2024, 1, 1), 50.0),
            RatePoint::new(d(2024, 3, 1), 75.0),
        ];

        let series = MonthlyAligner::align(&shock, &response).unwrap();
        // Overlap Jan..=Mar 2024 gives two moves.
        assert_eq!(series.len(), 2);
        assert_eq!(series.months()[0], d(2024, 2, 1));
        assert_eq!(series.months()[1], d(2024, 3, 1));
    }

    #[test]
    fn test_align_rejects_empty() {
        let result = MonthlyAligner::align(&[], &[RatePoint::new(d(2024, 1, 1), 0.0)]);
        assert!(matches!(
            result,
            Err(AlignmentError::EmptySeries { name: "shock" })
        ));
    }

    #[test]
    fn test_align_rejects_unordered() {
        let shock = vec![
            RatePoint::new(d(2024, 2, 1), 0.0),
            RatePoint::new(d(2024, 1, 1), 0.0),
        ];
        let response = vec![RatePoint::new(d(2024, 1, 1), 0.0)];
        let result = MonthlyAligner::align(&shock, &response);
        assert!(matches!(
            result,
            Err(AlignmentError::UnorderedDates { name: "shock", .. })
        ));
    }

    #[test]
    fn test_align_rejects_disjoint_windows() {
        let shock = vec![
            RatePoint::new(d(2020, 1, 1), 0.0),
            RatePoint::new(d(2020, 6, 1), 0.0),
        ];
        let response = vec![
            RatePoint::new(d(2024, 1, 1), 0.0),
            RatePoint::new(d(2024, 6, 1), 0.0),
        ];
        let result = MonthlyAligner::align(&shock, &response);
        assert!(matches!(result, Err(AlignmentError::NoOverlap)));
    }

    #[test]
    fn test_align_single_overlap_month_is_too_small() {
        let shock = vec![
            RatePoint::new(d(2024, 1, 1), 0.0),
            RatePoint::new(d(2024, 3, 1), 0.0),
        ];
        let response = vec![
            RatePoint::new(d(2023, 10, 1), 0.0),
            RatePoint::new(d(2024, 1, 5), 0.0),
        ];
        let result = MonthlyAligner::align(&shock, &response);
        assert!(matches!(result, Err(AlignmentError::SampleTooSmall { .. })));
    }
}
