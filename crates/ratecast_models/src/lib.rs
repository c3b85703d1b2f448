//! # Ratecast Models (L2: The Estimators)
//!
//! The two macro-forecasting estimators behind the engine:
//!
//! - **BVAR**: a two-variable Bayesian vector autoregression with Minnesota
//!   shrinkage — prior construction scaled by empirical variances, a
//!   regularized PSD-enforced posterior, companion-matrix stability
//!   diagnostics, and Cholesky-identified structural impulse responses under
//!   a fixed shock-first ordering.
//! - **Local Projections**: per-horizon direct shrinkage regressions with
//!   AIC-based lag selection, plus row-resampling bootstrap confidence
//!   intervals as the sole source of LP uncertainty.
//!
//! ## Design Principles
//!
//! - Fitting is a **pure function** of (configuration, data) producing an
//!   immutable fitted value; there is no in-place re-estimation
//! - Non-fatal conditions (instability, thin samples, skipped horizons)
//!   travel as advisories on [`Outcome`](ratecast_core::Outcome), never as
//!   silent defaults
//! - A fitted model is read-only and freely shareable across threads

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod bvar;
pub mod error;
pub mod lp;

pub use bvar::{
    BvarConfig, FittedBvar, MinnesotaPrior, PosteriorEstimate, PriorSpecification,
    StabilityVerdict, StructuralIrfSet,
};
pub use error::EstimationError;
pub use lp::{
    BootstrapConfig, HorizonModel, LocalProjectionsEstimator, LpConfig, LpModelSet, Shrinkage,
};
