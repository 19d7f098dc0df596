//! Additive Holt-Winters forecasting model.
//!
//! Triple exponential smoothing with an additive trend and an additive
//! seasonal cycle:
//! - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})`
//! - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
//! - Seasonal: `s_t = γ(y_t - l_t) + (1-γ)s_{t-m}`
//! - Forecast: `ŷ_{t+h} = l_t + h*b_t + s_{t+h-m}`
//!
//! Fitting is split in two pure steps: [`fit_params`] chooses α, β, γ by
//! minimizing the one-step-ahead sum of squared errors, and [`fit_state`]
//! runs the recursions once to obtain the final level, trend and seasonal
//! vector. [`project`] extrapolates a state without touching the data.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::{days_after, DailySeries, Forecast};
use crate::error::{EngineError, Result};
use crate::models::Forecaster;
use crate::utils::optimization::{minimize, SimplexConfig};
use crate::utils::stats::normal_quantile;

/// Weekly cycle on daily data.
pub const WEEKLY_PERIOD: usize = 7;

const PARAM_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Smoothing parameters of the additive model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl SmoothingParams {
    /// Parameters clamped into the open unit interval.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        let (lo, hi) = PARAM_BOUNDS;
        Self {
            alpha: alpha.clamp(lo, hi),
            beta: beta.clamp(lo, hi),
            gamma: gamma.clamp(lo, hi),
        }
    }
}

/// Final smoothing state after consuming a training series.
#[derive(Debug, Clone, PartialEq)]
pub struct HoltWintersState {
    pub level: f64,
    pub trend: f64,
    /// Seasonal components indexed by `t % period`.
    pub seasonals: Vec<f64>,
    /// Number of observations consumed.
    pub observations: usize,
}

/// Result of running the recursions over a series.
#[derive(Debug, Clone)]
pub struct FittedState {
    pub state: HoltWintersState,
    /// One-step-ahead predictions; the first season echoes the data.
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Sum of squared one-step-ahead errors after the first season.
    pub sse: f64,
}

fn check_history(values: &[f64], period: usize) -> Result<()> {
    if period < 2 {
        return Err(EngineError::InvalidParameter(format!(
            "seasonal period must be at least 2, got {period}"
        )));
    }
    if values.len() < 2 * period {
        return Err(EngineError::InsufficientHistory {
            needed: 2 * period,
            got: values.len(),
        });
    }
    Ok(())
}

/// Initial level, trend and seasonal components from the first two seasons.
///
/// The level is placed at the end of the first season so a purely linear
/// series starts with zero seasonal components.
fn initial_state(values: &[f64], period: usize) -> (f64, f64, Vec<f64>) {
    let m = period as f64;
    let first = &values[..period];
    let second = &values[period..2 * period];

    let first_mean = first.iter().sum::<f64>() / m;
    let second_mean = second.iter().sum::<f64>() / m;
    let trend = (second_mean - first_mean) / m;

    let centre = (m - 1.0) / 2.0;
    let level = first_mean + trend * centre;
    let mut seasonals: Vec<f64> = first
        .iter()
        .enumerate()
        .map(|(i, y)| y - (first_mean + trend * (i as f64 - centre)))
        .collect();
    let drift = seasonals.iter().sum::<f64>() / m;
    seasonals.iter_mut().for_each(|s| *s -= drift);

    (level, trend, seasonals)
}

/// Run the additive recursions over `values` with fixed parameters.
fn smooth(values: &[f64], period: usize, params: SmoothingParams) -> FittedState {
    let SmoothingParams { alpha, beta, gamma } = params;
    let (mut level, mut trend, mut seasonals) = initial_state(values, period);

    let mut fitted = Vec::with_capacity(values.len());
    let mut residuals = Vec::with_capacity(values.len());
    fitted.extend_from_slice(&values[..period]);
    residuals.resize(period, 0.0);

    let mut sse = 0.0;
    for (t, &y) in values.iter().enumerate().skip(period) {
        let slot = t % period;
        let s = seasonals[slot];
        let prediction = level + trend + s;
        let error = y - prediction;
        sse += error * error;
        fitted.push(prediction);
        residuals.push(error);

        let previous = level;
        level = alpha * (y - s) + (1.0 - alpha) * (previous + trend);
        trend = beta * (level - previous) + (1.0 - beta) * trend;
        seasonals[slot] = gamma * (y - level) + (1.0 - gamma) * s;
    }

    FittedState {
        state: HoltWintersState {
            level,
            trend,
            seasonals,
            observations: values.len(),
        },
        fitted,
        residuals,
        sse,
    }
}

/// Choose α, β, γ minimizing the one-step-ahead SSE over `values`.
///
/// Deterministic: the simplex always starts at (0.3, 0.1, 0.1).
pub fn fit_params(values: &[f64], period: usize) -> Result<SmoothingParams> {
    check_history(values, period)?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::InvalidParameter(
            "training values must be finite".to_string(),
        ));
    }

    let config = SimplexConfig {
        max_iter: 1000,
        tolerance: 1e-8,
        ..Default::default()
    };
    let result = minimize(
        |p| smooth(values, period, SmoothingParams::new(p[0], p[1], p[2])).sse,
        &[0.3, 0.1, 0.1],
        &[PARAM_BOUNDS; 3],
        &config,
    );
    tracing::debug!(
        iterations = result.iterations,
        converged = result.converged,
        sse = result.value,
        "holt-winters parameter search finished"
    );

    Ok(SmoothingParams::new(
        result.point[0],
        result.point[1],
        result.point[2],
    ))
}

/// Run the recursions with `params` and return the final state.
pub fn fit_state(values: &[f64], period: usize, params: SmoothingParams) -> Result<FittedState> {
    check_history(values, period)?;
    Ok(smooth(values, period, params))
}

/// Point forecasts for steps `1..=horizon` after the end of the fitted data.
pub fn project(state: &HoltWintersState, horizon: usize) -> Vec<f64> {
    let period = state.seasonals.len();
    (1..=horizon)
        .map(|h| {
            let seasonal = match period {
                0 => 0.0,
                _ => state.seasonals[(state.observations + h - 1) % period],
            };
            state.level + h as f64 * state.trend + seasonal
        })
        .collect()
}

/// Additive Holt-Winters forecaster over a [`DailySeries`].
#[derive(Debug, Clone)]
pub struct HoltWinters {
    seasonal_period: usize,
    /// Fixed parameters, or the ones chosen by the last fit when optimizing.
    params: Option<SmoothingParams>,
    optimize: bool,
    state: Option<HoltWintersState>,
    last_date: Option<NaiveDate>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
}

impl HoltWinters {
    /// Model with fixed smoothing parameters.
    pub fn new(params: SmoothingParams, seasonal_period: usize) -> Self {
        Self {
            seasonal_period,
            params: Some(params),
            optimize: false,
            state: None,
            last_date: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// Model whose parameters are chosen by minimizing in-sample SSE.
    pub fn auto(seasonal_period: usize) -> Self {
        Self {
            params: None,
            optimize: true,
            ..Self::new(SmoothingParams::new(0.3, 0.1, 0.1), seasonal_period)
        }
    }

    /// Auto-fitted model with a weekly cycle.
    pub fn weekly() -> Self {
        Self::auto(WEEKLY_PERIOD)
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn params(&self) -> Option<SmoothingParams> {
        self.params
    }

    pub fn state(&self) -> Option<&HoltWintersState> {
        self.state.as_ref()
    }

    fn forecast_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let last = self.last_date.ok_or(EngineError::FitRequired)?;
        days_after(last, horizon)
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::weekly()
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &DailySeries) -> Result<()> {
        let values = series.values();
        check_history(values, self.seasonal_period)?;

        let params = if self.optimize {
            fit_params(values, self.seasonal_period)?
        } else {
            self.params.ok_or(EngineError::FitRequired)?
        };
        let fit = fit_state(values, self.seasonal_period, params)?;

        let scored = values.len() - self.seasonal_period;
        self.residual_variance = Some(fit.sse / scored as f64);
        self.params = Some(params);
        self.state = Some(fit.state);
        self.fitted = Some(fit.fitted);
        self.residuals = Some(fit.residuals);
        self.last_date = series.end();
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(EngineError::FitRequired)?;
        let dates = self.forecast_dates(horizon)?;
        Forecast::from_values(dates, project(state, horizon))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {level}"
            )));
        }
        let state = self.state.as_ref().ok_or(EngineError::FitRequired)?;
        let dates = self.forecast_dates(horizon)?;
        let variance = self.residual_variance.unwrap_or(0.0);
        let z = normal_quantile((1.0 + level) / 2.0);

        let point = project(state, horizon);
        let (lower, upper): (Vec<f64>, Vec<f64>) = point
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                // Uncertainty grows with each completed season ahead.
                let seasons_ahead = i / self.seasonal_period + 1;
                let half_width = z * (variance * seasons_ahead as f64).sqrt();
                (p - half_width, p + half_width)
            })
            .unzip();

        Forecast::from_values_with_intervals(dates, point, lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "HoltWinters(additive)"
    }
}
