//! From forecast density to decision-grid probabilities.
//!
//! - [`discretize`]: analytic conversion of (mean, std, CI) into a
//!   normalized probability table over 25-bp moves
//! - [`calendar`]: geometric-decay allocation of the aggregate move
//!   probability across upcoming decision dates

pub mod calendar;
pub mod discretize;

pub use calendar::{CalendarAllocation, CalendarMapper, DecayProfile};
pub use discretize::{DiscretizationConfig, DiscretizationEngine, DistributionPoint};
