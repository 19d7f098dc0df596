//! Inventory policy engine.
//!
//! Demand statistics feed the policy calculator, whose output is compared
//! with the latest stock snapshot by the risk classifier. Each stage maps
//! product ids to fresh result records; nothing is mutated in place.

pub mod demand;
pub mod policy;
pub mod product;
pub mod risk;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Serialize, Serializer};

pub use demand::{DemandEstimator, DemandObservation, DemandStats};
pub use policy::{InventoryPolicy, PolicyBatch, PolicyCalculator, PolicyConfig};
pub use product::{resolve_lead_times, Product, Supplier};
pub use risk::{latest_snapshots, RiskClassifier, RiskRecord, RiskStatus, StockSnapshot};

use crate::config::InventoryConfig;
use crate::error::{EngineError, Result};

/// One row of the recommendation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    /// Written without a decimal part when it is a whole number of units.
    #[serde(serialize_with = "serialize_units")]
    pub stock_on_hand: f64,
    pub reorder_point: u64,
    pub safety_stock: u64,
    pub eoq: u64,
    pub risk_status: RiskStatus,
}

// Largest magnitude below which every whole f64 is exactly an i64.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

fn serialize_units<S: Serializer>(
    units: &f64,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    if units.fract() == 0.0 && units.abs() < EXACT_INTEGER_LIMIT {
        serializer.serialize_i64(*units as i64)
    } else {
        serializer.serialize_f64(*units)
    }
}

/// Everything computed by [`plan`].
#[derive(Debug, Clone, Default)]
pub struct InventoryPlan {
    pub stats: BTreeMap<String, DemandStats>,
    pub policies: BTreeMap<String, InventoryPolicy>,
    pub risks: BTreeMap<String, RiskRecord>,
    /// Sorted by product id, one per product with both a policy and a snapshot.
    pub recommendations: Vec<Recommendation>,
    /// Per-product guard violations that kept a product out of the policy table.
    pub excluded: Vec<EngineError>,
}

impl InventoryPlan {
    /// Number of recommendations per risk status.
    pub fn status_counts(&self) -> BTreeMap<RiskStatus, usize> {
        let mut counts = BTreeMap::new();
        for rec in &self.recommendations {
            *counts.entry(rec.risk_status).or_insert(0) += 1;
        }
        counts
    }
}

/// Run demand estimation, policy calculation and risk classification.
pub fn plan(
    observations: &[DemandObservation],
    snapshots: Vec<StockSnapshot>,
    products: &BTreeMap<String, Product>,
    config: &InventoryConfig,
) -> Result<InventoryPlan> {
    let estimator = DemandEstimator::new(config.demand_window_days)?;
    let calculator = PolicyCalculator::new(config.policy.clone())?;
    let classifier = RiskClassifier::new(config.overstock_dsi_days);

    let stats = estimator.estimate(observations)?;
    let PolicyBatch { policies, excluded } = calculator.compute_all(&stats, products);
    tracing::info!(
        policies = policies.len(),
        excluded = excluded.len(),
        "inventory policies computed"
    );

    let latest = latest_snapshots(snapshots);
    let risks: BTreeMap<String, RiskRecord> = policies
        .par_iter()
        .filter_map(|(id, policy)| {
            let snapshot = latest.get(id)?;
            let avg = stats.get(id).map_or(0.0, |s| s.avg_daily_sales);
            Some((
                id.clone(),
                classifier.classify(snapshot.stock_on_hand, policy, avg),
            ))
        })
        .collect();

    let recommendations = risks
        .iter()
        .filter_map(|(id, risk)| {
            let policy = policies.get(id)?;
            let product = products.get(id)?;
            let snapshot = latest.get(id)?;
            Some(Recommendation {
                product_id: id.clone(),
                product_name: product.product_name.clone(),
                category: product.category.clone(),
                stock_on_hand: snapshot.stock_on_hand,
                reorder_point: policy.reorder_point,
                safety_stock: policy.safety_stock,
                eoq: policy.eoq,
                risk_status: risk.risk_status,
            })
        })
        .collect();

    Ok(InventoryPlan {
        stats,
        policies,
        risks,
        recommendations,
        excluded,
    })
}
