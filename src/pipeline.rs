//! Batch orchestration of the forecast and inventory jobs.
//!
//! Each job reads its source tables, runs the pure computations and writes
//! one output table. A fatal error leaves any previous output untouched.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{ForecastConfig, PipelineConfig};
use crate::core::{aggregate_daily, DailySeries, Forecast};
use crate::error::{EngineError, Result};
use crate::inventory::{self, resolve_lead_times, InventoryPlan, Product};
use crate::io;
use crate::models::exponential::SmoothingParams;
use crate::models::{Forecaster, HoltWinters};
use crate::utils::{evaluate, Evaluation};

/// Result of the forecast job.
#[derive(Debug, Clone)]
pub struct ForecastReport {
    /// Hold-out accuracy; `None` when the history was too short to split.
    pub evaluation: Option<Evaluation>,
    /// Smoothing parameters of the final model fitted on the full history.
    pub params: SmoothingParams,
    pub forecast: Forecast,
}

/// Result of the inventory job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    pub recommendations: usize,
    pub excluded: Vec<String>,
    pub status_counts: BTreeMap<String, usize>,
}

impl InventoryReport {
    fn from_plan(plan: &InventoryPlan) -> Self {
        Self {
            recommendations: plan.recommendations.len(),
            excluded: plan.excluded.iter().map(ToString::to_string).collect(),
            status_counts: plan
                .status_counts()
                .into_iter()
                .map(|(status, n)| (status.label().to_string(), n))
                .collect(),
        }
    }
}

/// Evaluate on a hold-out, refit on the whole series and forecast ahead.
pub fn forecast_series(series: &DailySeries, config: &ForecastConfig) -> Result<ForecastReport> {
    let period = config.seasonal_period;
    let evaluation = holdout_evaluation(series, config)?;

    let mut model = HoltWinters::auto(period);
    model.fit(series)?;
    let params = model.params().ok_or(EngineError::FitRequired)?;
    tracing::info!(
        model = model.name(),
        alpha = params.alpha,
        beta = params.beta,
        gamma = params.gamma,
        observations = series.len(),
        "final model fitted"
    );

    let forecast = match config.interval_level {
        Some(level) => model.predict_with_intervals(config.horizon, level)?,
        None => model.predict(config.horizon)?,
    };

    Ok(ForecastReport {
        evaluation,
        params,
        forecast,
    })
}

fn holdout_evaluation(series: &DailySeries, config: &ForecastConfig) -> Result<Option<Evaluation>> {
    let period = config.seasonal_period;
    let holdout = config.holdout_days;
    let train_len = series.len().saturating_sub(holdout);

    if holdout == 0 || train_len < 2 * period {
        tracing::warn!(
            observations = series.len(),
            holdout,
            needed = 2 * period + holdout,
            "history too short for hold-out evaluation, skipping"
        );
        return Ok(None);
    }

    let (train, test) = series.split_tail(holdout)?;
    let mut model = HoltWinters::auto(period);
    model.fit(&train)?;
    let predicted = model.predict(test.len())?;
    let evaluation = evaluate(&test, &predicted)?;

    match evaluation.mape {
        Some(mape) => tracing::info!(
            mape_pct = mape * 100.0,
            rmse = evaluation.rmse,
            points = evaluation.points,
            "hold-out evaluation"
        ),
        None => tracing::info!(
            rmse = evaluation.rmse,
            points = evaluation.points,
            "hold-out evaluation, MAPE undefined (all actuals zero)"
        ),
    }
    Ok(Some(evaluation))
}

/// Forecast job: master table in, forecast table out.
pub fn run_forecast(config: &PipelineConfig) -> Result<ForecastReport> {
    let rows = io::load_master_table(&config.paths.master_table)?;
    let series = aggregate_daily(io::revenue_records(&rows))?;
    tracing::info!(
        rows = rows.len(),
        days = series.len(),
        start = %series.start(),
        "daily revenue series built"
    );

    let report = forecast_series(&series, &config.forecast)?;
    io::write_forecast(&config.paths.forecast_output, &report.forecast)?;
    Ok(report)
}

/// Inventory job: master, product and supplier tables in, recommendation table out.
pub fn run_inventory(config: &PipelineConfig) -> Result<InventoryReport> {
    let rows = io::load_master_table(&config.paths.master_table)?;
    let products = io::load_products(&config.paths.products)?;
    let suppliers = io::load_suppliers(&config.paths.suppliers)?;

    let products: BTreeMap<String, Product> = resolve_lead_times(products, &suppliers)
        .into_iter()
        .map(|p| (p.product_id.clone(), p))
        .collect();

    let plan = inventory::plan(
        &io::demand_observations(&rows),
        io::stock_snapshots(&rows),
        &products,
        &config.inventory,
    )?;

    let report = InventoryReport::from_plan(&plan);
    for (status, count) in &report.status_counts {
        tracing::info!(status = status.as_str(), count, "risk status");
    }

    io::write_recommendations(&config.paths.recommendations_output, &plan.recommendations)?;
    Ok(report)
}
