//! Output table writers.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::Forecast;
use crate::error::{EngineError, Result};
use crate::inventory::Recommendation;

#[derive(Serialize)]
struct ForecastRow {
    date: NaiveDate,
    forecasted_revenue: f64,
}

#[derive(Serialize)]
struct ForecastIntervalRow {
    date: NaiveDate,
    forecasted_revenue: f64,
    lower_bound: f64,
    upper_bound: f64,
}

/// Write `date, forecasted_revenue`, plus `lower_bound, upper_bound` when
/// the forecast carries intervals.
pub fn write_forecast(path: &Path, forecast: &Forecast) -> Result<()> {
    let file = create_file(path)?;
    write_forecast_to(file, forecast)?;
    tracing::info!(path = %path.display(), rows = forecast.horizon(), "forecast written");
    Ok(())
}

pub fn write_forecast_to<W: Write>(writer: W, forecast: &Forecast) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    match (forecast.lower(), forecast.upper()) {
        (Some(lower), Some(upper)) => {
            for (i, (date, value)) in forecast.iter().enumerate() {
                csv_writer
                    .serialize(ForecastIntervalRow {
                        date,
                        forecasted_revenue: value,
                        lower_bound: lower[i],
                        upper_bound: upper[i],
                    })
                    .map_err(write_error)?;
            }
        }
        _ => {
            for (date, value) in forecast.iter() {
                csv_writer
                    .serialize(ForecastRow {
                        date,
                        forecasted_revenue: value,
                    })
                    .map_err(write_error)?;
            }
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the recommendation table in the order given.
pub fn write_recommendations(path: &Path, rows: &[Recommendation]) -> Result<()> {
    let file = create_file(path)?;
    write_recommendations_to(file, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "recommendations written");
    Ok(())
}

pub fn write_recommendations_to<W: Write>(writer: W, rows: &[Recommendation]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer
            .write_record(RECOMMENDATION_COLUMNS)
            .map_err(write_error)?;
    }
    for row in rows {
        csv_writer.serialize(row).map_err(write_error)?;
    }
    csv_writer.flush()?;
    Ok(())
}

// Serialized headers are only emitted with the first row.
const RECOMMENDATION_COLUMNS: [&str; 8] = [
    "product_id",
    "product_name",
    "category",
    "stock_on_hand",
    "reorder_point",
    "safety_stock",
    "eoq",
    "risk_status",
];

fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

fn write_error(err: csv::Error) -> EngineError {
    EngineError::Io(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::RiskStatus;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
            .collect()
    }

    fn render(forecast: &Forecast) -> String {
        let mut out = Vec::new();
        write_forecast_to(&mut out, forecast).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn forecast_table_layout() {
        let forecast = Forecast::from_values(dates(2), vec![100.5, 98.0]).unwrap();
        assert_eq!(
            render(&forecast),
            "date,forecasted_revenue\n2024-01-01,100.5\n2024-01-02,98.0\n"
        );
    }

    #[test]
    fn forecast_table_with_intervals() {
        let forecast = Forecast::from_values_with_intervals(
            dates(1),
            vec![10.0],
            vec![8.0],
            vec![12.0],
        )
        .unwrap();
        assert_eq!(
            render(&forecast),
            "date,forecasted_revenue,lower_bound,upper_bound\n2024-01-01,10.0,8.0,12.0\n"
        );
    }

    #[test]
    fn recommendation_table_layout() {
        let rows = vec![Recommendation {
            product_id: "P1".to_string(),
            product_name: "Widget".to_string(),
            category: "Tools".to_string(),
            stock_on_hand: 5.0,
            reorder_point: 79,
            safety_stock: 9,
            eoq: 136,
            risk_status: RiskStatus::LowStock,
        }];
        let mut out = Vec::new();
        write_recommendations_to(&mut out, &rows).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "product_id,product_name,category,stock_on_hand,reorder_point,safety_stock,eoq,risk_status\n\
             P1,Widget,Tools,5,79,9,136,Low Stock - Reorder Now\n"
        );
    }

    #[test]
    fn fractional_stock_keeps_its_decimals() {
        let row = |stock_on_hand: f64| Recommendation {
            product_id: "P1".to_string(),
            product_name: "Widget".to_string(),
            category: "Tools".to_string(),
            stock_on_hand,
            reorder_point: 10,
            safety_stock: 2,
            eoq: 40,
            risk_status: RiskStatus::Healthy,
        };
        let mut out = Vec::new();
        write_recommendations_to(&mut out, &[row(2.5), row(300.0), row(0.0)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "P1,Widget,Tools,2.5,10,2,40,Healthy");
        assert_eq!(lines[2], "P1,Widget,Tools,300,10,2,40,Healthy");
        assert_eq!(lines[3], "P1,Widget,Tools,0,10,2,40,Healthy");
    }

    #[test]
    fn empty_recommendation_table_keeps_header() {
        let mut out = Vec::new();
        write_recommendations_to(&mut out, &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "product_id,product_name,category,stock_on_hand,reorder_point,safety_stock,eoq,risk_status\n"
        );
    }

    #[test]
    fn writer_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/forecast.csv");
        let forecast = Forecast::from_values(dates(3), vec![1.0, 2.0, 3.0]).unwrap();
        write_forecast(&path, &forecast).unwrap();
        assert!(path.exists());
    }
}
