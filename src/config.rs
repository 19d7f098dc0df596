//! Pipeline configuration.
//!
//! Every field has a default, so an empty or partial TOML file is valid:
//!
//! ```toml
//! [forecast]
//! horizon = 14
//! interval_level = 0.9
//!
//! [inventory.policy]
//! service_level_z = 2.33
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::inventory::PolicyConfig;
use crate::models::exponential::WEEKLY_PERIOD;

/// Upper bound on any configured span of days (about a century).
pub const MAX_SPAN_DAYS: usize = 36_500;

/// Input and output table locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub master_table: PathBuf,
    pub products: PathBuf,
    pub suppliers: PathBuf,
    pub forecast_output: PathBuf,
    pub recommendations_output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            master_table: PathBuf::from("data/processed/master_table.csv"),
            products: PathBuf::from("data/raw/products.csv"),
            suppliers: PathBuf::from("data/raw/suppliers.csv"),
            forecast_output: PathBuf::from("data/predictions/forecast_30days.csv"),
            recommendations_output: PathBuf::from(
                "data/optimization/inventory_recommendations.csv",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Days forecast past the last observed date.
    pub horizon: usize,
    /// Trailing days held out to evaluate the model before the final refit.
    pub holdout_days: usize,
    pub seasonal_period: usize,
    /// Coverage of the optional prediction interval, in (0, 1).
    pub interval_level: Option<f64>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 30,
            holdout_days: 30,
            seasonal_period: WEEKLY_PERIOD,
            interval_level: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub demand_window_days: usize,
    /// Days of supply above which stock counts as excess.
    pub overstock_dsi_days: f64,
    pub policy: PolicyConfig,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            demand_window_days: 90,
            overstock_dsi_days: 90.0,
            policy: PolicyConfig::default(),
        }
    }
}

/// Top-level configuration shared by both batch jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub forecast: ForecastConfig,
    pub inventory: InventoryConfig,
}

impl PipelineConfig {
    /// Load from a TOML file, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                if !path.exists() {
                    return Err(EngineError::InputMissing {
                        path: path.display().to_string(),
                    });
                }
                let text = fs::read_to_string(path)?;
                Self::from_toml(&text)?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let f = &self.forecast;
        if f.horizon == 0 {
            return Err(EngineError::Config("forecast.horizon must be positive".into()));
        }
        check_span("forecast.horizon", f.horizon)?;
        check_span("forecast.holdout_days", f.holdout_days)?;
        if f.seasonal_period < 2 {
            return Err(EngineError::Config(format!(
                "forecast.seasonal_period must be at least 2, got {}",
                f.seasonal_period
            )));
        }
        if let Some(level) = f.interval_level {
            if !(level > 0.0 && level < 1.0) {
                return Err(EngineError::Config(format!(
                    "forecast.interval_level must be in (0, 1), got {level}"
                )));
            }
        }

        let inv = &self.inventory;
        if inv.demand_window_days == 0 {
            return Err(EngineError::Config(
                "inventory.demand_window_days must be positive".into(),
            ));
        }
        check_span("inventory.demand_window_days", inv.demand_window_days)?;
        if !(inv.overstock_dsi_days.is_finite() && inv.overstock_dsi_days > 0.0) {
            return Err(EngineError::Config(format!(
                "inventory.overstock_dsi_days must be positive, got {}",
                inv.overstock_dsi_days
            )));
        }
        inv.policy.validate()
    }
}

fn check_span(name: &str, days: usize) -> Result<()> {
    if days > MAX_SPAN_DAYS {
        return Err(EngineError::Config(format!(
            "{name} must be at most {MAX_SPAN_DAYS} days, got {days}"
        )));
    }
    Ok(())
}
