//! Forecasting models.

mod traits;

pub mod exponential;

pub use exponential::HoltWinters;
pub use traits::Forecaster;
