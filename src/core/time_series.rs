//! DailySeries data structure: one value per calendar day on a gap-free grid.

use crate::error::{EngineError, Result};
use chrono::{Days, Duration, NaiveDate};

/// A daily time series with no missing or duplicated days.
///
/// Dates are stored implicitly as `start + i` days, so the grid is
/// gap-free and strictly increasing by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a series starting at `start` with one value per consecutive day.
    pub fn from_start(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::InvalidParameter(
                "daily series values must be finite".to_string(),
            ));
        }
        Ok(Self { start, values })
    }

    /// Create a series from explicit `(date, value)` pairs.
    ///
    /// Dates must advance by exactly one day at every step.
    pub fn from_pairs(pairs: &[(NaiveDate, f64)]) -> Result<Self> {
        let Some(&(start, _)) = pairs.first() else {
            return Err(EngineError::EmptyData);
        };

        for (i, window) in pairs.windows(2).enumerate() {
            let (prev, next) = (window[0].0, window[1].0);
            if next - prev != Duration::days(1) {
                return Err(EngineError::DateMismatch(format!(
                    "dates must be consecutive days: {prev} followed by {next} at position {}",
                    i + 1
                )));
            }
        }

        Self::from_start(start, pairs.iter().map(|(_, v)| *v).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First date covered by the series.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date covered by the series, `None` when empty.
    pub fn end(&self) -> Option<NaiveDate> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.date_at(self.values.len() - 1))
        }
    }

    /// Date of the observation at `index`.
    pub fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// All dates of the series in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.values.len()).map(|i| self.date_at(i)).collect()
    }

    /// Iterate over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (self.date_at(i), v))
    }

    /// The `horizon` dates that follow the last observation.
    pub fn following_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let Some(last) = self.end() else {
            // An empty series is followed by its own start date.
            if horizon == 0 {
                return Ok(Vec::new());
            }
            let mut dates = vec![self.start];
            dates.extend(days_after(self.start, horizon - 1)?);
            return Ok(dates);
        };
        days_after(last, horizon)
    }

    /// Get a sub-series covering indices `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Result<DailySeries> {
        if start > end || end > self.values.len() {
            return Err(EngineError::InvalidParameter(format!(
                "invalid slice [{start}, {end}) for series of length {}",
                self.values.len()
            )));
        }
        Ok(DailySeries {
            start: self.date_at(start),
            values: self.values[start..end].to_vec(),
        })
    }

    /// Split into a head and the trailing `tail_len` observations.
    pub fn split_tail(&self, tail_len: usize) -> Result<(DailySeries, DailySeries)> {
        let cut = self.values.len().checked_sub(tail_len).ok_or_else(|| {
            EngineError::InsufficientHistory {
                needed: tail_len,
                got: self.values.len(),
            }
        })?;
        Ok((self.slice(0, cut)?, self.slice(cut, self.values.len())?))
    }
}

/// The `horizon` calendar days after `last`.
///
/// Fails instead of overflowing when the range leaves the representable calendar.
pub fn days_after(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    let reachable = u64::try_from(horizon)
        .ok()
        .and_then(|h| last.checked_add_days(Days::new(h)))
        .is_some();
    if !reachable {
        return Err(EngineError::InvalidParameter(format!(
            "horizon of {horizon} days from {last} is outside the calendar"
        )));
    }
    Ok(last.iter_days().skip(1).take(horizon).collect())
}
