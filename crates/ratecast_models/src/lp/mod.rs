//! Local projections: horizon-by-horizon direct regressions.
//!
//! Instead of iterating one model forward, each horizon `h` regresses the
//! `h`-months-ahead response directly on the current shock and lagged
//! controls. Horizons are independent (and parallelizable); uncertainty
//! comes exclusively from a row-resampling bootstrap, with no parametric
//! assumption.
//!
//! - [`regression`] — shrinkage fits (ridge closed-form, L1 paths by
//!   coordinate descent)
//! - [`estimator`] — per-horizon design assembly, AIC lag selection, and
//!   the fitted [`LpModelSet`]
//! - [`bootstrap`] — percentile confidence intervals for the horizon shock
//!   coefficients

pub mod bootstrap;
pub mod estimator;
pub mod regression;

pub use bootstrap::{BootstrapCi, BootstrapConfig};
pub use estimator::{HorizonModel, LocalProjectionsEstimator, LpConfig, LpModelSet};
pub use regression::Shrinkage;
