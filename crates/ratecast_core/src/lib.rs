//! # Ratecast Core (L1: Foundation)
//!
//! Shared types, data alignment, and numerical primitives for the ratecast
//! forecasting engine.
//!
//! This crate provides:
//! - Aligned monthly series construction from event-driven rate histories
//! - Lagged design-matrix assembly for the estimator layer
//! - Dense linear-algebra helpers (PSD projection, spectral radius, Cholesky)
//! - Standard normal distribution functions for analytic bin probabilities
//! - Descriptive statistics (percentiles, sample moments)
//! - The error taxonomy and the tagged [`Outcome`](types::Outcome) type that
//!   separates hard failures from usable-with-caveats results
//!
//! ## Design Principles
//!
//! - **Immutable value objects** produced by pure functions; no hidden state
//! - **Advisories are data**, not log lines: callers decide how to surface them
//! - **Explicit errors** for every failure mode; nothing panics on bad input

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod align;
pub mod math;
pub mod types;

pub use align::MonthlyAligner;
pub use types::{
    Advisory, AlignedSeries, AlignmentError, ConfigurationError, Outcome, RatePoint, ScaleInfo,
    N_VARS,
};
