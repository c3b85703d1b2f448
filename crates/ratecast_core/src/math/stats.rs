//! Descriptive statistics for draw aggregation and prior scaling.

/// Arithmetic mean; 0.0 for an empty slice.
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator); 0.0 for fewer than two
/// observations.
pub fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (n - 1) as f64
}

/// Unbiased sample standard deviation.
#[inline]
pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Percentile of a sample by linear interpolation between order statistics.
///
/// `q` is in percent (e.g. 2.5, 50.0, 97.5) and is clamped to [0, 100].
/// Returns 0.0 for an empty slice. The input need not be sorted.
///
/// # Examples
/// ```
/// use ratecast_core::math::stats::percentile;
///
/// let draws = vec![4.0, 1.0, 3.0, 2.0];
/// assert_eq!(percentile(&draws, 50.0), 2.5);
/// assert_eq!(percentile(&draws, 0.0), 1.0);
/// assert_eq!(percentile(&draws, 100.0), 4.0);
/// ```
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q = q.clamp(0.0, 100.0);
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

/// Rounds `x` to the nearest multiple of `step`.
///
/// Used to snap expected moves onto the 25-bp decision grid. Returns `x`
/// unchanged when `step` is not positive.
#[inline]
pub fn round_to_step(x: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return x;
    }
    (x / step).round() * step
}
