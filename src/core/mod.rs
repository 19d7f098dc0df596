//! Core data structures for daily series and forecasts.

pub mod aggregate;
mod forecast;
mod time_series;

pub use aggregate::{aggregate_daily, aggregate_window, daily_totals, zero_fill};
pub use forecast::Forecast;
pub use time_series::{days_after, DailySeries};
