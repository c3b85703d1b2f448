//! Numerical primitives shared by the estimator and engine layers.
//!
//! - `linalg`: dense symmetric-matrix helpers (PSD projection, condition
//!   numbers, guarded Cholesky, spectral radius)
//! - `normal`: standard normal distribution functions
//! - `stats`: descriptive statistics (sample moments, percentiles)

pub mod linalg;
pub mod normal;
pub mod stats;
