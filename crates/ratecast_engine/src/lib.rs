//! # Ratecast Engine (L3: Forecasting & Orchestration)
//!
//! The inference layer on top of the fitted estimators:
//!
//! - **Conditional forecasting**: a seeded, reproducible Monte-Carlo
//!   recursion that propagates an imposed foreign-shock path through the
//!   fitted BVAR, horizon by horizon
//! - **Discretization**: analytic conversion of a forecast density into a
//!   sum-to-one probability table over 25-bp moves
//! - **Calendar mapping**: geometric-decay distribution of the aggregate
//!   move probability across upcoming decision dates
//! - **Orchestration**: engine selection (BVAR vs. local projections),
//!   report assembly, evaluation, and audit snapshots
//!
//! ## Concurrency Contract
//!
//! Fitting is synchronous and requires exclusive ownership. A fitted
//! [`RateForecaster`](orchestrator::RateForecaster) is read-only: `predict`
//! and `evaluate` take `&self`, every inference call owns a local RNG, and
//! the forecaster is safely shareable across threads with no locking.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod distribution;
pub mod error;
pub mod mc;
pub mod orchestrator;
pub mod rng;
pub mod snapshot;

pub use distribution::{
    CalendarAllocation, CalendarMapper, DecayProfile, DiscretizationConfig, DiscretizationEngine,
    DistributionPoint,
};
pub use error::{ForecastError, SnapshotError};
pub use mc::{
    ConditionalForecaster, ForecastPath, HorizonForecast, MonteCarloConfig, ShockExtension,
};
pub use orchestrator::{
    EngineKind, EvaluationReport, ForecasterConfig, PredictRequest, PredictionReport,
    RateForecaster,
};
pub use rng::ForecastRng;
pub use snapshot::ModelSnapshot;
