//! Product and supplier reference data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A sellable product as listed in the product reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub cost_price: f64,
    pub selling_price: f64,
    pub supplier_id: String,
    /// Replenishment lead time; taken from the supplier when the product table omits it.
    #[serde(default)]
    pub lead_time_days: Option<f64>,
}

impl Product {
    /// True when the listed selling price is below the unit cost.
    pub fn sells_below_cost(&self) -> bool {
        self.selling_price < self.cost_price
    }
}

/// A supplier as listed in the supplier reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub supplier_id: String,
    pub supplier_name: String,
    pub lead_time_days: f64,
}

/// Fill missing product lead times from the matching supplier.
///
/// Products that already carry a lead time keep it. Products whose supplier
/// is unknown stay without one and are rejected later by the policy guard.
pub fn resolve_lead_times(products: Vec<Product>, suppliers: &[Supplier]) -> Vec<Product> {
    let by_id: HashMap<&str, f64> = suppliers
        .iter()
        .map(|s| (s.supplier_id.as_str(), s.lead_time_days))
        .collect();

    products
        .into_iter()
        .map(|mut product| {
            if product.lead_time_days.is_none() {
                product.lead_time_days = by_id.get(product.supplier_id.as_str()).copied();
            }
            product
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn product_fixture(id: &str, cost_price: f64, lead_time_days: Option<f64>) -> Product {
    Product {
        product_id: id.to_string(),
        product_name: format!("Electronics - {id}"),
        category: "Electronics".to_string(),
        cost_price,
        selling_price: cost_price * 1.5,
        supplier_id: "SUP_001".to_string(),
        lead_time_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(id: &str, lead: f64) -> Supplier {
        Supplier {
            supplier_id: id.to_string(),
            supplier_name: format!("{id} Ltd"),
            lead_time_days: lead,
        }
    }

    #[test]
    fn missing_lead_time_comes_from_supplier() {
        let products = vec![product_fixture("PROD_0001", 10.0, None)];
        let resolved = resolve_lead_times(products, &[supplier("SUP_001", 9.0)]);
        assert_eq!(resolved[0].lead_time_days, Some(9.0));
    }

    #[test]
    fn explicit_lead_time_wins() {
        let products = vec![product_fixture("PROD_0001", 10.0, Some(4.0))];
        let resolved = resolve_lead_times(products, &[supplier("SUP_001", 9.0)]);
        assert_eq!(resolved[0].lead_time_days, Some(4.0));
    }

    #[test]
    fn selling_below_cost_is_detected() {
        let mut product = product_fixture("PROD_0003", 100.0, Some(7.0));
        assert!(!product.sells_below_cost());

        product.selling_price = 100.0;
        assert!(!product.sells_below_cost());

        product.selling_price = 4.0;
        assert!(product.sells_below_cost());
    }

    #[test]
    fn unknown_supplier_leaves_lead_time_empty() {
        let mut product = product_fixture("PROD_0002", 10.0, None);
        product.supplier_id = "SUP_404".to_string();
        let resolved = resolve_lead_times(vec![product], &[supplier("SUP_001", 9.0)]);
        assert_eq!(resolved[0].lead_time_days, None);
    }
}
