//! Trailing-window demand statistics per product.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use serde::Serialize;

use crate::core::aggregate_window;
use crate::error::{EngineError, Result};
use crate::utils::stats::{mean, std_dev};

/// Units of a product sold on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandObservation {
    pub date: NaiveDate,
    pub product_id: String,
    pub quantity: f64,
}

/// Mean and spread of daily unit demand over the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandStats {
    pub product_id: String,
    pub avg_daily_sales: f64,
    /// Sample standard deviation. Zero when the window holds a single day,
    /// where the statistic is undefined.
    pub std_daily_sales: f64,
    /// Days in the window, including zero-filled ones.
    pub window_days: usize,
    /// Set when `std_daily_sales` was defaulted to zero.
    pub std_defaulted: bool,
}

impl DemandStats {
    /// Stats from a zero-filled daily quantity window.
    pub fn from_window(product_id: impl Into<String>, quantities: &[f64]) -> Result<Self> {
        if quantities.is_empty() {
            return Err(EngineError::EmptyData);
        }
        let (std_daily_sales, std_defaulted) = if quantities.len() < 2 {
            (0.0, true)
        } else {
            (std_dev(quantities), false)
        };
        Ok(Self {
            product_id: product_id.into(),
            avg_daily_sales: mean(quantities),
            std_daily_sales,
            window_days: quantities.len(),
            std_defaulted,
        })
    }
}

/// Computes [`DemandStats`] over the last `window_days` of the dataset.
#[derive(Debug, Clone)]
pub struct DemandEstimator {
    window_days: usize,
}

impl DemandEstimator {
    pub fn new(window_days: usize) -> Result<Self> {
        if window_days == 0 {
            return Err(EngineError::InvalidParameter(
                "demand window must cover at least one day".to_string(),
            ));
        }
        Ok(Self { window_days })
    }

    pub fn window_days(&self) -> usize {
        self.window_days
    }

    /// The `[start, end]` window ending at the latest date in `observations`.
    ///
    /// The window never starts before the earliest observation.
    pub fn window(&self, observations: &[DemandObservation]) -> Result<(NaiveDate, NaiveDate)> {
        let end = observations
            .iter()
            .map(|o| o.date)
            .max()
            .ok_or(EngineError::EmptyData)?;
        let first = observations
            .iter()
            .map(|o| o.date)
            .min()
            .ok_or(EngineError::EmptyData)?;
        // Windows reaching past the calendar start cover the whole history.
        let start = u64::try_from(self.window_days - 1)
            .ok()
            .and_then(|back| end.checked_sub_days(Days::new(back)))
            .map_or(first, |start| start.max(first));
        Ok((start, end))
    }

    /// Stats for every product with at least one observation inside the window.
    ///
    /// Days without an observation count as zero demand.
    pub fn estimate(
        &self,
        observations: &[DemandObservation],
    ) -> Result<BTreeMap<String, DemandStats>> {
        let (start, end) = self.window(observations)?;

        let mut per_product: BTreeMap<&str, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for obs in observations {
            if obs.date >= start && obs.date <= end {
                per_product
                    .entry(obs.product_id.as_str())
                    .or_default()
                    .push((obs.date, obs.quantity));
            }
        }

        let stats = per_product
            .into_par_iter()
            .map(|(product_id, records)| -> Result<(String, DemandStats)> {
                let series = aggregate_window(records, start, end)?;
                let stats = DemandStats::from_window(product_id, series.values())?;
                if stats.std_defaulted {
                    tracing::debug!(
                        product_id,
                        "single-day demand window, standard deviation taken as 0"
                    );
                }
                Ok((product_id.to_string(), stats))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        tracing::info!(
            products = stats.len(),
            %start,
            %end,
            "demand statistics computed"
        );
        Ok(stats)
    }
}

impl Default for DemandEstimator {
    fn default() -> Self {
        Self { window_days: 90 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Duration::days(offset)
    }

    fn obs(offset: i64, product: &str, quantity: f64) -> DemandObservation {
        DemandObservation {
            date: day(offset),
            product_id: product.to_string(),
            quantity,
        }
    }

    #[test]
    fn window_is_trailing_and_clipped() {
        let estimator = DemandEstimator::new(90).unwrap();

        let long: Vec<_> = (0..200).map(|d| obs(d, "A", 1.0)).collect();
        assert_eq!(estimator.window(&long).unwrap(), (day(110), day(199)));

        let short: Vec<_> = (0..30).map(|d| obs(d, "A", 1.0)).collect();
        assert_eq!(estimator.window(&short).unwrap(), (day(0), day(29)));
    }

    #[test]
    fn oversized_window_covers_whole_history() {
        let data: Vec<_> = (0..10).map(|d| obs(d, "A", 2.0)).collect();

        for window_days in [1_000_000_000_000_000, usize::MAX] {
            let estimator = DemandEstimator::new(window_days).unwrap();
            assert_eq!(estimator.window(&data).unwrap(), (day(0), day(9)));
            let stats = estimator.estimate(&data).unwrap();
            assert_eq!(stats["A"].window_days, 10);
            assert_relative_eq!(stats["A"].avg_daily_sales, 2.0);
        }
    }

    #[test]
    fn mean_and_sample_std() {
        let estimator = DemandEstimator::new(5).unwrap();
        let data: Vec<_> = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .enumerate()
            .map(|(i, q)| obs(i as i64, "A", *q))
            .collect();

        let stats = estimator.estimate(&data).unwrap();
        let a = &stats["A"];
        assert_relative_eq!(a.avg_daily_sales, 3.0);
        assert_relative_eq!(a.std_daily_sales, 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(a.window_days, 5);
        assert!(!a.std_defaulted);
    }

    #[test]
    fn missing_days_count_as_zero() {
        let estimator = DemandEstimator::new(4).unwrap();
        // "B" fixes the window to days 0..=3; "A" only sells on day 3.
        let data = vec![obs(0, "B", 1.0), obs(3, "B", 1.0), obs(3, "A", 8.0)];

        let stats = estimator.estimate(&data).unwrap();
        assert_relative_eq!(stats["A"].avg_daily_sales, 2.0);
        assert_eq!(stats["A"].window_days, 4);
    }

    #[test]
    fn products_outside_window_are_skipped() {
        let estimator = DemandEstimator::new(10).unwrap();
        let data = vec![obs(0, "OLD", 5.0), obs(50, "NEW", 5.0)];

        let stats = estimator.estimate(&data).unwrap();
        assert!(stats.contains_key("NEW"));
        assert!(!stats.contains_key("OLD"));
    }

    #[test]
    fn single_day_window_defaults_std_to_zero() {
        let estimator = DemandEstimator::new(1).unwrap();
        let data = vec![obs(0, "A", 3.0), obs(1, "A", 7.0)];

        let stats = estimator.estimate(&data).unwrap();
        assert_relative_eq!(stats["A"].avg_daily_sales, 7.0);
        assert_relative_eq!(stats["A"].std_daily_sales, 0.0);
        assert!(stats["A"].std_defaulted);
    }

    #[test]
    fn same_day_rows_are_summed() {
        let estimator = DemandEstimator::new(2).unwrap();
        let data = vec![obs(0, "A", 1.0), obs(1, "A", 2.0), obs(1, "A", 3.0)];

        let stats = estimator.estimate(&data).unwrap();
        assert_relative_eq!(stats["A"].avg_daily_sales, 3.0);
    }

    #[test]
    fn empty_input_and_zero_window_are_errors() {
        assert!(matches!(
            DemandEstimator::default().estimate(&[]),
            Err(EngineError::EmptyData)
        ));
        assert!(DemandEstimator::new(0).is_err());
    }
}
