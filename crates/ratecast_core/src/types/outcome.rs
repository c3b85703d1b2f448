//! Tagged outcome type separating hard failures from usable-with-caveats
//! results.
//!
//! Estimation can succeed cleanly, succeed with advisories (an unstable
//! companion matrix, a thin sample), or fail outright. Hard failures travel
//! through `Result::Err`; this module provides the [`Outcome`] type for the
//! first two cases so callers can distinguish "usable" from "usable with
//! caveats" without string matching.

use std::fmt;

/// A non-fatal advisory attached to an otherwise usable result.
///
/// Advisories never suppress model use; they are surfaced to callers and
/// folded into rationale text at prediction time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Advisory {
    /// The companion matrix has an eigenvalue modulus at or above one.
    Unstable {
        /// Largest eigenvalue modulus of the companion matrix.
        max_modulus: f64,
    },

    /// The aligned sample is smaller than the comfortable minimum.
    InsufficientSample {
        /// Rows available after alignment.
        n_obs: usize,
        /// Comfortable minimum for the requested lag order.
        required: usize,
    },

    /// A local-projections horizon was skipped for lack of usable rows.
    SkippedHorizon {
        /// The horizon that was skipped.
        horizon: usize,
        /// Usable rows after lead/lag alignment.
        usable_rows: usize,
    },

    /// The reported forecast std deviated from the CI-implied std by more
    /// than the tolerance and was overridden.
    StdOverridden {
        /// Std as reported by the forecaster.
        reported: f64,
        /// Std implied by the confidence interval width.
        implied: f64,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::Unstable { max_modulus } => write!(
                f,
                "companion matrix is non-stationary (max eigenvalue modulus {:.4})",
                max_modulus
            ),
            Advisory::InsufficientSample { n_obs, required } => write!(
                f,
                "aligned sample is thin ({} rows, {} recommended)",
                n_obs, required
            ),
            Advisory::SkippedHorizon {
                horizon,
                usable_rows,
            } => write!(
                f,
                "horizon {} skipped ({} usable rows, 10 required)",
                horizon, usable_rows
            ),
            Advisory::StdOverridden { reported, implied } => write!(
                f,
                "reported std {:.4} overridden by CI-implied std {:.4}",
                reported, implied
            ),
        }
    }
}

/// A usable value, possibly accompanied by advisories.
///
/// `Outcome` is the success half of a fallible operation; pair it with a
/// `Result` for hard failures:
///
/// ```text
/// Result<Outcome<T>, E>
///   Ok(Outcome::Ok(value))                 clean success
///   Ok(Outcome::Warning(value, advisories)) usable with caveats
///   Err(e)                                  unusable
/// ```
///
/// # Examples
///
/// ```
/// use ratecast_core::{Advisory, Outcome};
///
/// let clean = Outcome::new(42, vec![]);
/// assert!(matches!(clean, Outcome::Ok(42)));
///
/// let caveated = Outcome::new(42, vec![Advisory::Unstable { max_modulus: 1.02 }]);
/// assert_eq!(*caveated.value(), 42);
/// assert_eq!(caveated.advisories().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Clean success.
    Ok(T),
    /// Usable result with one or more advisories attached.
    Warning(T, Vec<Advisory>),
}

impl<T> Outcome<T> {
    /// Wraps a value, producing `Ok` when the advisory list is empty.
    pub fn new(value: T, advisories: Vec<Advisory>) -> Self {
        if advisories.is_empty() {
            Outcome::Ok(value)
        } else {
            Outcome::Warning(value, advisories)
        }
    }

    /// Returns a reference to the contained value.
    #[inline]
    pub fn value(&self) -> &T {
        match self {
            Outcome::Ok(v) | Outcome::Warning(v, _) => v,
        }
    }

    /// Consumes the outcome, returning the contained value and dropping any
    /// advisories.
    #[inline]
    pub fn into_value(self) -> T {
        match self {
            Outcome::Ok(v) | Outcome::Warning(v, _) => v,
        }
    }

    /// Returns the attached advisories (empty for `Ok`).
    #[inline]
    pub fn advisories(&self) -> &[Advisory] {
        match self {
            Outcome::Ok(_) => &[],
            Outcome::Warning(_, a) => a,
        }
    }

    /// Consumes the outcome, returning the value and its advisories.
    pub fn into_parts(self) -> (T, Vec<Advisory>) {
        match self {
            Outcome::Ok(v) => (v, Vec::new()),
            Outcome::Warning(v, a) => (v, a),
        }
    }

    /// Maps the contained value, preserving advisories.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Outcome::Ok(v) => Outcome::Ok(f(v)),
            Outcome::Warning(v, a) => Outcome::Warning(f(v), a),
        }
    }

    /// True when no advisories are attached.
    #[inline]
    pub fn is_clean(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_new_collapses_empty_advisories() {
        let o = Outcome::new(1.0, vec![]);
        assert!(o.is_clean());
    }

    #[test]
    fn test_outcome_preserves_advisories() {
        let o = Outcome::new(
            1.0,
            vec![Advisory::InsufficientSample {
                n_obs: 6,
                required: 8,
            }],
        );
        assert!(!o.is_clean());
        assert_eq!(o.advisories().len(), 1);
    }

    #[test]
    fn test_outcome_map_keeps_advisories() {
        let o = Outcome::new(2, vec![Advisory::Unstable { max_modulus: 1.1 }]);
        let mapped = o.map(|v| v * 10);
        assert_eq!(*mapped.value(), 20);
        assert_eq!(mapped.advisories().len(), 1);
    }

    #[test]
    fn test_outcome_into_parts() {
        let (v, a) = Outcome::new(7, vec![]).into_parts();
        assert_eq!(v, 7);
        assert!(a.is_empty());
    }

    #[test]
    fn test_advisory_display() {
        let msg = Advisory::Unstable { max_modulus: 1.05 }.to_string();
        assert!(msg.contains("1.05"));

        let msg = Advisory::SkippedHorizon {
            horizon: 5,
            usable_rows: 7,
        }
        .to_string();
        assert!(msg.contains("horizon 5"));
    }
}
