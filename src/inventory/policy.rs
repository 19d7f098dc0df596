//! Safety stock, reorder point and economic order quantity per product.
//!
//! Every derived quantity is rounded up so the policy never under-provisions:
//! - `safety_stock = ceil(z * σ_d * sqrt(L))`
//! - `reorder_point = ceil(μ_d * L + safety_stock)`
//! - `eoq = ceil(sqrt(2 * D * S / H))` with `D = 365 μ_d`, `H = cost_price * holding_cost_rate`

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::inventory::demand::DemandStats;
use crate::inventory::product::Product;
use crate::utils::stats::normal_quantile;

const DAYS_PER_YEAR: f64 = 365.0;

// Float noise from means and square roots must not push an exact integer up a unit.
const CEIL_TOLERANCE: f64 = 1e-9;

/// Cost and service-level constants of the policy calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// One-sided z-score of the target service level (1.645 ≈ 95%).
    pub service_level_z: f64,
    /// Fixed cost of placing one order.
    pub order_cost: f64,
    /// Yearly holding cost as a fraction of unit cost.
    pub holding_cost_rate: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            service_level_z: 1.645,
            order_cost: 50.0,
            holding_cost_rate: 0.20,
        }
    }
}

impl PolicyConfig {
    /// Default costs with z derived from a one-sided service level in (0.5, 1).
    pub fn from_service_level(service_level: f64) -> Result<Self> {
        if !(service_level > 0.5 && service_level < 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "service level must be in (0.5, 1), got {service_level}"
            )));
        }
        Ok(Self {
            service_level_z: normal_quantile(service_level),
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.service_level_z.is_finite() && self.service_level_z >= 0.0) {
            return Err(EngineError::Config(format!(
                "service_level_z must be a finite non-negative number, got {}",
                self.service_level_z
            )));
        }
        if !(self.order_cost.is_finite() && self.order_cost > 0.0) {
            return Err(EngineError::Config(format!(
                "order_cost must be positive, got {}",
                self.order_cost
            )));
        }
        if !(self.holding_cost_rate.is_finite() && self.holding_cost_rate > 0.0) {
            return Err(EngineError::Config(format!(
                "holding_cost_rate must be positive, got {}",
                self.holding_cost_rate
            )));
        }
        Ok(())
    }
}

/// Replenishment parameters derived for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryPolicy {
    pub product_id: String,
    pub safety_stock: u64,
    pub reorder_point: u64,
    pub eoq: u64,
    pub annual_demand: f64,
    pub holding_cost_per_unit: f64,
    pub lead_time_days: f64,
}

/// Policies for a batch of products plus the products that could not get one.
#[derive(Debug, Clone, Default)]
pub struct PolicyBatch {
    pub policies: BTreeMap<String, InventoryPolicy>,
    /// `NumericGuard` errors, one per excluded product, ordered by product id.
    pub excluded: Vec<EngineError>,
}

/// Converts demand statistics and product attributes into an [`InventoryPolicy`].
#[derive(Debug, Clone)]
pub struct PolicyCalculator {
    config: PolicyConfig,
}

impl PolicyCalculator {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Policy for one product.
    ///
    /// Fails with `NumericGuard` when the lead time or holding cost is not
    /// positive, or the demand statistics are not usable.
    pub fn compute(&self, stats: &DemandStats, product: &Product) -> Result<InventoryPolicy> {
        let id = product.product_id.as_str();
        if product.sells_below_cost() {
            tracing::warn!(
                product_id = %id,
                cost_price = product.cost_price,
                selling_price = product.selling_price,
                "selling price below cost price"
            );
        }

        let lead_time_days = product.lead_time_days.ok_or_else(|| {
            EngineError::guard(
                id,
                format!("no lead time for supplier {}", product.supplier_id),
            )
        })?;
        if !(lead_time_days.is_finite() && lead_time_days > 0.0) {
            return Err(EngineError::guard(
                id,
                format!("lead time must be positive, got {lead_time_days}"),
            ));
        }

        let holding_cost_per_unit = product.cost_price * self.config.holding_cost_rate;
        if !(holding_cost_per_unit.is_finite() && holding_cost_per_unit > 0.0) {
            return Err(EngineError::guard(
                id,
                format!(
                    "holding cost per unit must be positive, got {holding_cost_per_unit} (cost price {})",
                    product.cost_price
                ),
            ));
        }

        let (avg, std) = (stats.avg_daily_sales, stats.std_daily_sales);
        if !(avg.is_finite() && avg >= 0.0 && std.is_finite() && std >= 0.0) {
            return Err(EngineError::guard(
                id,
                format!("demand statistics must be non-negative, got mean {avg} and std {std}"),
            ));
        }

        let safety_stock = ceil_units(self.config.service_level_z * std * lead_time_days.sqrt());
        let reorder_point = ceil_units(avg * lead_time_days + safety_stock as f64);
        let annual_demand = avg * DAYS_PER_YEAR;
        let eoq = if annual_demand == 0.0 {
            0
        } else {
            ceil_units((2.0 * annual_demand * self.config.order_cost / holding_cost_per_unit).sqrt())
        };

        Ok(InventoryPolicy {
            product_id: product.product_id.clone(),
            safety_stock,
            reorder_point,
            eoq,
            annual_demand,
            holding_cost_per_unit,
            lead_time_days,
        })
    }

    /// Policies for every product with demand statistics.
    ///
    /// Products are evaluated independently; a guard violation only drops
    /// that product and is logged with its reason.
    pub fn compute_all(
        &self,
        stats: &BTreeMap<String, DemandStats>,
        products: &BTreeMap<String, Product>,
    ) -> PolicyBatch {
        let outcomes: Vec<(String, Result<InventoryPolicy>)> = stats
            .par_iter()
            .map(|(id, s)| {
                let outcome = match products.get(id) {
                    Some(product) => self.compute(s, product),
                    None => Err(EngineError::guard(
                        id.as_str(),
                        "not found in product reference table",
                    )),
                };
                (id.clone(), outcome)
            })
            .collect();

        let mut batch = PolicyBatch::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(policy) => {
                    batch.policies.insert(id, policy);
                }
                Err(err) => {
                    tracing::warn!(product_id = %id, reason = %err, "product excluded from policy table");
                    batch.excluded.push(err);
                }
            }
        }
        batch
    }
}

/// Round a non-negative quantity up to whole units; anything else maps to 0.
fn ceil_units(x: f64) -> u64 {
    if x.is_finite() && x > 0.0 {
        (x - CEIL_TOLERANCE).ceil().max(0.0) as u64
    } else {
        0
    }
}
