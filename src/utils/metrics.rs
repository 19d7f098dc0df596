//! Accuracy metrics for scoring a forecast against a held-out series.

use serde::Serialize;

use crate::core::{DailySeries, Forecast};
use crate::error::{EngineError, Result};

/// Accuracy of a forecast over a holdout period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Mean absolute percentage error as a fraction (0.12 = 12%).
    ///
    /// Days with an actual value of zero are excluded because the ratio is
    /// undefined there; `None` when every actual is zero.
    pub mape: Option<f64>,
    /// Root mean squared error over all days.
    pub rmse: f64,
    /// Mean absolute error over all days.
    pub mae: f64,
    /// Number of days compared.
    pub points: usize,
    /// Days left out of the MAPE because their actual was zero.
    pub zero_actuals: usize,
}

/// Score `forecast` against `actual`; dates must line up one to one.
pub fn evaluate(actual: &DailySeries, forecast: &Forecast) -> Result<Evaluation> {
    if actual.is_empty() || forecast.is_empty() {
        return Err(EngineError::EmptyData);
    }
    if actual.len() != forecast.horizon() {
        return Err(EngineError::DimensionMismatch {
            expected: actual.len(),
            got: forecast.horizon(),
        });
    }
    if forecast.dates().first() != Some(&actual.start()) {
        return Err(EngineError::DateMismatch(format!(
            "forecast starts {:?} but holdout starts {}",
            forecast.dates().first(),
            actual.start()
        )));
    }

    let a = actual.values();
    let p = forecast.point();
    Ok(Evaluation {
        mape: mape(a, p),
        rmse: rmse(a, p),
        mae: mae(a, p),
        points: a.len(),
        zero_actuals: a.iter().filter(|v| **v == 0.0).count(),
    })
}

/// MAPE over the indices where `actual != 0`, as a fraction.
///
/// Returns `None` for mismatched lengths or when no index has a non-zero actual.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.len() != predicted.len() {
        return None;
    }
    let (sum, count) = actual
        .iter()
        .zip(predicted)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(sum, count), (a, p)| {
            (sum + ((a - p) / a).abs(), count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, d).unwrap()
    }

    fn dated(start: u32, values: Vec<f64>) -> (DailySeries, Vec<NaiveDate>) {
        let series = DailySeries::from_start(day(start), values).unwrap();
        let dates = series.dates();
        (series, dates)
    }

    #[test]
    fn perfect_forecast_scores_zero() {
        let (actual, dates) = dated(1, vec![1.0, 2.0, 3.0]);
        let forecast = Forecast::from_values(dates, vec![1.0, 2.0, 3.0]).unwrap();

        let eval = evaluate(&actual, &forecast).unwrap();
        assert_relative_eq!(eval.mape.unwrap(), 0.0);
        assert_relative_eq!(eval.rmse, 0.0);
        assert_eq!(eval.points, 3);
        assert_eq!(eval.zero_actuals, 0);
    }

    #[test]
    fn known_values() {
        // errors: 10, -10, 20
        let actual = [100.0, 50.0, 200.0];
        let predicted = [90.0, 60.0, 180.0];

        // (0.1 + 0.2 + 0.1) / 3
        assert_relative_eq!(mape(&actual, &predicted).unwrap(), 0.4 / 3.0, epsilon = 1e-12);
        // sqrt((100 + 100 + 400) / 3)
        assert_relative_eq!(rmse(&actual, &predicted), 200.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(mae(&actual, &predicted), 40.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn mape_excludes_zero_actuals() {
        let (actual, dates) = dated(1, vec![0.0, 10.0, 0.0, 20.0]);
        let forecast = Forecast::from_values(dates, vec![5.0, 12.0, 1.0, 18.0]).unwrap();

        let eval = evaluate(&actual, &forecast).unwrap();
        // Only 10 -> 12 and 20 -> 18 count: (0.2 + 0.1) / 2
        assert_relative_eq!(eval.mape.unwrap(), 0.15, epsilon = 1e-12);
        assert_eq!(eval.zero_actuals, 2);
        // RMSE still covers every day.
        assert_relative_eq!(eval.rmse, ((25.0 + 4.0 + 1.0 + 4.0) / 4.0_f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn all_zero_actuals_have_no_mape() {
        assert!(mape(&[0.0, 0.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn length_mismatch_is_error() {
        let (actual, _) = dated(1, vec![1.0, 2.0, 3.0]);
        let forecast = Forecast::from_values(vec![day(1), day(2)], vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            evaluate(&actual, &forecast),
            Err(EngineError::DimensionMismatch { expected: 3, got: 2 })
        ));
        assert!(rmse(&[1.0], &[1.0, 2.0]).is_nan());
    }

    #[test]
    fn misaligned_dates_are_error() {
        let (actual, _) = dated(1, vec![1.0, 2.0]);
        let forecast = Forecast::from_values(vec![day(2), day(3)], vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            evaluate(&actual, &forecast),
            Err(EngineError::DateMismatch(_))
        ));
    }

    #[test]
    fn empty_inputs_are_error() {
        let (actual, _) = dated(1, vec![1.0]);
        assert!(matches!(
            evaluate(&actual, &Forecast::new()),
            Err(EngineError::EmptyData)
        ));
    }
}
