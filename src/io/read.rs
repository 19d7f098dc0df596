//! Table loaders with header checks.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{EngineError, Result};
use crate::inventory::{DemandObservation, Product, StockSnapshot, Supplier};

pub const MASTER_TABLE: &str = "master_table";
pub const PRODUCTS_TABLE: &str = "products";
pub const SUPPLIERS_TABLE: &str = "suppliers";

const MASTER_COLUMNS: &[&str] = &["date", "product_id", "quantity", "revenue"];
const PRODUCT_COLUMNS: &[&str] = &[
    "product_id",
    "product_name",
    "category",
    "cost_price",
    "selling_price",
    "supplier_id",
];
const SUPPLIER_COLUMNS: &[&str] = &["supplier_id", "supplier_name", "lead_time_days"];

/// One transaction line of the master table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MasterRow {
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub product_id: String,
    pub quantity: f64,
    pub revenue: f64,
    /// Units on hand at end of day; empty cells and a missing column read as `None`.
    #[serde(default)]
    pub stock_on_hand: Option<f64>,
}

/// Revenue per transaction, ready for daily aggregation.
pub fn revenue_records(rows: &[MasterRow]) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    rows.iter().map(|r| (r.date, r.revenue))
}

pub fn demand_observations(rows: &[MasterRow]) -> Vec<DemandObservation> {
    rows.iter()
        .map(|r| DemandObservation {
            date: r.date,
            product_id: r.product_id.clone(),
            quantity: r.quantity,
        })
        .collect()
}

/// Stock snapshots with absent stock counted as zero units.
pub fn stock_snapshots(rows: &[MasterRow]) -> Vec<StockSnapshot> {
    rows.iter()
        .map(|r| StockSnapshot {
            product_id: r.product_id.clone(),
            date: r.date,
            stock_on_hand: r.stock_on_hand.unwrap_or(0.0),
        })
        .collect()
}

pub fn load_master_table(path: &Path) -> Result<Vec<MasterRow>> {
    read_table(path, MASTER_TABLE, MASTER_COLUMNS)
}

pub fn load_products(path: &Path) -> Result<Vec<Product>> {
    read_table(path, PRODUCTS_TABLE, PRODUCT_COLUMNS)
}

pub fn load_suppliers(path: &Path) -> Result<Vec<Supplier>> {
    read_table(path, SUPPLIERS_TABLE, SUPPLIER_COLUMNS)
}

/// Read a CSV file, failing with `InputMissing` when it does not exist.
pub fn read_table<T: DeserializeOwned>(
    path: &Path,
    table: &str,
    required: &[&str],
) -> Result<Vec<T>> {
    if !path.is_file() {
        return Err(EngineError::InputMissing {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path)?;
    let rows = read_records(file, table, required)?;
    tracing::debug!(table, rows = rows.len(), path = %path.display(), "table loaded");
    Ok(rows)
}

/// Deserialize every record of a CSV stream after checking its header.
///
/// Columns beyond `required` are ignored.
pub fn read_records<R: Read, T: DeserializeOwned>(
    reader: R,
    table: &str,
    required: &[&str],
) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| malformed(table, &e))?
        .clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(EngineError::SchemaMismatch {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        let row: T = result.map_err(|e| malformed(table, &e))?;
        rows.push(row);
    }
    Ok(rows)
}

fn malformed(table: &str, err: &csv::Error) -> EngineError {
    EngineError::MalformedRecord {
        table: table.to_string(),
        line: err.position().map_or(0, |p| p.line()),
        message: err.to_string(),
    }
}

/// Accepts `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS`, keeping only the day.
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| serde::de::Error::custom(format!("expected a date, got '{s}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "\
date,product_id,quantity,revenue,stock_on_hand,region
2023-01-01,P1,3,30.0,12,north
2023-01-01,P2,1,15.5,,south
2023-01-02 00:00:00,P1,2,20.0,10,north
";

    #[test]
    fn master_rows_ignore_extra_columns() {
        let rows: Vec<MasterRow> =
            read_records(MASTER.as_bytes(), MASTER_TABLE, MASTER_COLUMNS).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].product_id, "P1");
        assert_eq!(rows[1].stock_on_hand, None);
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
    }

    #[test]
    fn empty_stock_becomes_zero_snapshot() {
        let rows: Vec<MasterRow> =
            read_records(MASTER.as_bytes(), MASTER_TABLE, MASTER_COLUMNS).unwrap();
        let snapshots = stock_snapshots(&rows);
        assert_eq!(snapshots[1].stock_on_hand, 0.0);
        assert_eq!(snapshots[0].stock_on_hand, 12.0);
    }

    #[test]
    fn stock_column_is_optional() {
        let csv = "date,product_id,quantity,revenue\n2023-01-01,P1,3,30.0\n";
        let rows: Vec<MasterRow> =
            read_records(csv.as_bytes(), MASTER_TABLE, MASTER_COLUMNS).unwrap();
        assert_eq!(rows[0].stock_on_hand, None);
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let csv = "date,product_id,quantity\n2023-01-01,P1,3\n";
        let err = read_records::<_, MasterRow>(csv.as_bytes(), MASTER_TABLE, MASTER_COLUMNS)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::SchemaMismatch {
                table: "master_table".to_string(),
                column: "revenue".to_string(),
            }
        );
    }

    #[test]
    fn bad_cell_is_malformed_record() {
        let csv = "date,product_id,quantity,revenue\n2023-01-01,P1,3,30\n2023-01-02,P1,three,20\n";
        let err = read_records::<_, MasterRow>(csv.as_bytes(), MASTER_TABLE, MASTER_COLUMNS)
            .unwrap_err();
        assert!(matches!(err, EngineError::MalformedRecord { line, .. } if line > 1));
        assert!(err.is_fatal());
    }

    #[test]
    fn bad_date_is_malformed_record() {
        let csv = "date,product_id,quantity,revenue\n01/02/2023,P1,3,30\n";
        assert!(matches!(
            read_records::<_, MasterRow>(csv.as_bytes(), MASTER_TABLE, MASTER_COLUMNS),
            Err(EngineError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn products_with_and_without_lead_time() {
        let csv = "\
product_id,product_name,category,cost_price,selling_price,supplier_id,lead_time_days
P1,Widget,Tools,10.0,15.0,S1,
P2,Gadget,Tools,20.0,30.0,S2,4
";
        let products: Vec<Product> =
            read_records(csv.as_bytes(), PRODUCTS_TABLE, PRODUCT_COLUMNS).unwrap();
        assert_eq!(products[0].lead_time_days, None);
        assert_eq!(products[1].lead_time_days, Some(4.0));
    }

    #[test]
    fn missing_file_is_input_missing() {
        let err = load_suppliers(Path::new("/nonexistent/suppliers.csv")).unwrap_err();
        assert!(matches!(err, EngineError::InputMissing { .. }));
    }
}
