//! Numerical utilities shared by the forecasting and inventory modules.

pub mod metrics;
pub mod optimization;
pub mod stats;

pub use metrics::{evaluate, Evaluation};
pub use optimization::{minimize, Minimum, SimplexConfig};
pub use stats::normal_quantile;
