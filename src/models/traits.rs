//! Forecaster trait defining the interface the pipeline drives.

use crate::core::{DailySeries, Forecast};
use crate::error::Result;

/// Common interface for daily forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to a daily series.
    fn fit(&mut self, series: &DailySeries) -> Result<()>;

    /// Forecast the `horizon` days following the fitted series.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Forecast with symmetric prediction intervals at `level` (e.g. 0.95).
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// In-sample one-step-ahead predictions.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// In-sample residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Model name for logs and reports.
    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}
