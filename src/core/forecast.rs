//! Forecast result structure: dated point predictions with optional intervals.

use chrono::NaiveDate;

use crate::error::{EngineError, Result};

/// A forecast of `horizon` consecutive days.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    dates: Vec<NaiveDate>,
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from dates and point predictions.
    pub fn from_values(dates: Vec<NaiveDate>, point: Vec<f64>) -> Result<Self> {
        if dates.len() != point.len() {
            return Err(EngineError::DimensionMismatch {
                expected: dates.len(),
                got: point.len(),
            });
        }
        Ok(Self {
            dates,
            point,
            lower: None,
            upper: None,
        })
    }

    /// Create a forecast with lower and upper prediction bounds.
    pub fn from_values_with_intervals(
        dates: Vec<NaiveDate>,
        point: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        for bound in [&lower, &upper] {
            if bound.len() != point.len() {
                return Err(EngineError::DimensionMismatch {
                    expected: point.len(),
                    got: bound.len(),
                });
            }
        }
        let mut forecast = Self::from_values(dates, point)?;
        forecast.lower = Some(lower);
        forecast.upper = Some(upper);
        Ok(forecast)
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Point predictions.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn has_intervals(&self) -> bool {
        self.lower.is_some() && self.upper.is_some()
    }

    /// Iterate over `(date, point)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.point.iter().copied())
    }
}
