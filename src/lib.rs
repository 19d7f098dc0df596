//! # stockcast
//!
//! Batch revenue forecasting and inventory policy engine.
//!
//! Two jobs share one library:
//! - the forecast job aggregates transaction revenue to a daily series,
//!   evaluates an additive Holt-Winters model on a hold-out window and
//!   writes a 30-day forecast;
//! - the inventory job estimates trailing demand per product, derives
//!   safety stock, reorder point and economic order quantity, and flags
//!   each product as low on stock, overstocked or healthy.

pub mod config;
pub mod core;
pub mod error;
pub mod inventory;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod telemetry;
pub mod utils;

pub use error::{EngineError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{DailySeries, Forecast};
    pub use crate::error::{EngineError, Result};
    pub use crate::inventory::{
        InventoryPolicy, PolicyCalculator, Recommendation, RiskClassifier, RiskStatus,
    };
    pub use crate::models::{Forecaster, HoltWinters};
    pub use crate::pipeline::{run_forecast, run_inventory, ForecastReport, InventoryReport};
    pub use crate::utils::{evaluate, Evaluation};
}
