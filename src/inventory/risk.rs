//! Stock risk classification against the computed policy.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::inventory::policy::InventoryPolicy;

/// Risk verdict for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum RiskStatus {
    #[default]
    #[serde(rename = "Healthy")]
    Healthy,
    /// Stock is at or below the reorder point.
    #[serde(rename = "Low Stock - Reorder Now")]
    LowStock,
    /// More days of supply on hand than the overstock threshold.
    #[serde(rename = "Overstock - Reduce")]
    Overstock,
}

impl RiskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RiskStatus::Healthy => "Healthy",
            RiskStatus::LowStock => "Low Stock - Reorder Now",
            RiskStatus::Overstock => "Overstock - Reduce",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Units on hand for a product at the end of a day.
#[derive(Debug, Clone, PartialEq)]
pub struct StockSnapshot {
    pub product_id: String,
    pub date: NaiveDate,
    pub stock_on_hand: f64,
}

/// Snapshots taken on the latest date of the whole dataset, one per product.
///
/// Products with no row on that date are not current and are left out.
/// When a product has several rows on that date the last one read wins.
pub fn latest_snapshots<I>(snapshots: I) -> BTreeMap<String, StockSnapshot>
where
    I: IntoIterator<Item = StockSnapshot>,
{
    let snapshots: Vec<StockSnapshot> = snapshots.into_iter().collect();
    let Some(latest_date) = snapshots.iter().map(|s| s.date).max() else {
        return BTreeMap::new();
    };
    snapshots
        .into_iter()
        .filter(|s| s.date == latest_date)
        .map(|s| (s.product_id.clone(), s))
        .collect()
}

/// Classification of one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskRecord {
    pub product_id: String,
    pub risk_status: RiskStatus,
    /// Days of supply; `None` when average demand is zero, read as unbounded.
    pub dsi: Option<f64>,
}

/// Compares stock on hand with the policy and recent demand.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    overstock_dsi_days: f64,
}

impl RiskClassifier {
    pub fn new(overstock_dsi_days: f64) -> Self {
        Self { overstock_dsi_days }
    }

    pub fn overstock_dsi_days(&self) -> f64 {
        self.overstock_dsi_days
    }

    /// Classify a product.
    ///
    /// LowStock is checked first and wins over Overstock. With zero average
    /// demand the days of supply are unbounded, so any stock above the
    /// reorder point is Overstock.
    pub fn classify(
        &self,
        stock_on_hand: f64,
        policy: &InventoryPolicy,
        avg_daily_sales: f64,
    ) -> RiskRecord {
        let dsi = if avg_daily_sales > 0.0 {
            Some(stock_on_hand / avg_daily_sales)
        } else {
            None
        };

        let risk_status = if stock_on_hand <= policy.reorder_point as f64 {
            RiskStatus::LowStock
        } else if dsi.map_or(true, |days| days > self.overstock_dsi_days) {
            RiskStatus::Overstock
        } else {
            RiskStatus::Healthy
        };

        RiskRecord {
            product_id: policy.product_id.clone(),
            risk_status,
            dsi,
        }
    }
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self::new(90.0)
    }
}
