//! Monte-Carlo simulation configuration.
//!
//! Configuration is immutable once built; use [`MonteCarloConfigBuilder`]
//! to construct instances with validation at build time.

use ratecast_core::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Maximum number of Monte-Carlo draws allowed per horizon.
pub const MAX_DRAWS: usize = 1_000_000;

/// Maximum forecast horizon in months.
pub const MAX_HORIZON: usize = 60;

/// Policy for extending an imposed shock path beyond its last element.
///
/// The default holds the last imposed value; the alternative assumes the
/// foreign cycle stops. Neither is a correctness requirement — the choice
/// belongs to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShockExtension {
    /// Repeat the last imposed value for remaining horizons.
    #[default]
    HoldLast,
    /// Impose zero for remaining horizons.
    Zero,
}

/// Monte-Carlo forecast configuration.
///
/// # Examples
///
/// ```rust
/// use ratecast_engine::mc::{MonteCarloConfig, ShockExtension};
///
/// let config = MonteCarloConfig::builder()
///     .n_draws(2_000)
///     .seed(42)
///     .shock_extension(ShockExtension::Zero)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_draws(), 2_000);
/// assert_eq!(config.seed(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Number of draws per horizon.
    n_draws: usize,
    /// Seed for the per-call RNG.
    seed: u64,
    /// Extension policy beyond the imposed path.
    shock_extension: ShockExtension,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            n_draws: 1000,
            seed: 42,
            shock_extension: ShockExtension::default(),
        }
    }
}

impl MonteCarloConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }

    /// Number of draws per horizon.
    #[inline]
    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    /// RNG seed.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shock-path extension policy.
    #[inline]
    pub fn shock_extension(&self) -> ShockExtension {
        self.shock_extension
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when `n_draws` is zero or exceeds
    /// [`MAX_DRAWS`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.n_draws == 0 || self.n_draws > MAX_DRAWS {
            return Err(ConfigurationError::InvalidParameter {
                name: "n_draws",
                detail: format!("{} outside valid range [1, {}]", self.n_draws, MAX_DRAWS),
            });
        }
        Ok(())
    }
}

/// Builder for [`MonteCarloConfig`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MonteCarloConfigBuilder {
    n_draws: Option<usize>,
    seed: Option<u64>,
    shock_extension: ShockExtension,
}

impl MonteCarloConfigBuilder {
    /// Sets the number of draws per horizon (defaults to 1000).
    #[inline]
    pub fn n_draws(mut self, n_draws: usize) -> Self {
        self.n_draws = Some(n_draws);
        self
    }

    /// Sets the RNG seed (defaults to 42).
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the shock-path extension policy (defaults to `HoldLast`).
    #[inline]
    pub fn shock_extension(mut self, policy: ShockExtension) -> Self {
        self.shock_extension = policy;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the draw count is invalid.
    pub fn build(self) -> Result<MonteCarloConfig, ConfigurationError> {
        let defaults = MonteCarloConfig::default();
        let config = MonteCarloConfig {
            n_draws: self.n_draws.unwrap_or(defaults.n_draws),
            seed: self.seed.unwrap_or(defaults.seed),
            shock_extension: self.shock_extension,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = MonteCarloConfig::builder().build().unwrap();
        assert_eq!(config.n_draws(), 1000);
        assert_eq!(config.seed(), 42);
        assert_eq!(config.shock_extension(), ShockExtension::HoldLast);
    }

    #[test]
    fn test_builder_overrides() {
        let config = MonteCarloConfig::builder()
            .n_draws(500)
            .seed(9)
            .shock_extension(ShockExtension::Zero)
            .build()
            .unwrap();
        assert_eq!(config.n_draws(), 500);
        assert_eq!(config.seed(), 9);
        assert_eq!(config.shock_extension(), ShockExtension::Zero);
    }

    #[test]
    fn test_zero_draws_rejected() {
        let result = MonteCarloConfig::builder().n_draws(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_excessive_draws_rejected() {
        let result = MonteCarloConfig::builder().n_draws(MAX_DRAWS + 1).build();
        assert!(result.is_err());
    }
}
