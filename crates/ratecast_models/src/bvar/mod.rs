//! Bayesian vector autoregression with Minnesota shrinkage.
//!
//! The BVAR pipeline, in dependency order:
//!
//! 1. [`prior`] — Minnesota prior mean/variance scaled by empirical move
//!    variances
//! 2. [`posterior`] — regularized per-equation Bayesian update with PSD
//!    enforcement of the residual covariance
//! 3. [`stability`] — companion-matrix eigenvalue diagnostics (advisory,
//!    never blocking)
//! 4. [`irf`] — Cholesky-identified, unit-shock-normalized structural
//!    impulse responses under the fixed shock-first ordering
//! 5. [`model`] — the fit entry point tying the stages into an immutable
//!    [`FittedBvar`]

pub mod irf;
pub mod model;
pub mod posterior;
pub mod prior;
pub mod stability;

pub use irf::{StructuralIrfCalculator, StructuralIrfSet};
pub use model::{BvarConfig, FittedBvar};
pub use posterior::PosteriorEstimate;
pub use prior::{MinnesotaPrior, PriorSpecification};
pub use stability::{StabilityChecker, StabilityVerdict};
