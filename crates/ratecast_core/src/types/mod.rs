//! Core types for the forecasting engine.
//!
//! This module provides:
//! - `error`: Structured error types for configuration and alignment failures
//! - `outcome`: The tagged [`Outcome`] type carrying advisories alongside values
//! - `series`: Event-driven rate points and the aligned monthly series
//!
//! # Re-exports
//!
//! Commonly used types are re-exported at this module level:
//! - [`ConfigurationError`], [`AlignmentError`] from `error`
//! - [`Outcome`], [`Advisory`] from `outcome`
//! - [`RatePoint`], [`AlignedSeries`], [`ScaleInfo`], [`N_VARS`] from `series`

pub mod error;
pub mod outcome;
pub mod series;

pub use error::{AlignmentError, ConfigurationError};
pub use outcome::{Advisory, Outcome};
pub use series::{AlignedSeries, RatePoint, ScaleInfo, N_VARS};
