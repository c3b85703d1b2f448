//! Monte-Carlo conditional forecasting.
//!
//! - [`config`]: builder-validated simulation configuration (draw count,
//!   seed, shock-extension policy)
//! - [`forecaster`]: the horizon-by-horizon conditional recursion

pub mod config;
pub mod forecaster;

pub use config::{MonteCarloConfig, MonteCarloConfigBuilder, ShockExtension};
pub use forecaster::{ConditionalForecaster, ForecastPath, HorizonForecast};
