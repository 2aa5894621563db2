//! Product discount table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::option::SelectOption;
use crate::row::CostType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: i64,
    pub name: String,
}

/// Discounts of one product as returned by the server, keyed by cost type
/// code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDiscounts {
    pub id: i64,
    #[serde(default)]
    pub discounts: BTreeMap<String, Vec<Discount>>,
}

/// A discount available to a row, tagged with what it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscountOffer {
    pub id: i64,
    pub name: String,
    pub cost_type: CostType,
    pub product_id: i64,
}

impl DiscountOffer {
    pub fn to_option(&self) -> SelectOption {
        SelectOption::new(self.id.to_string(), self.name.clone())
    }
}

/// Discounts by product and cost type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountTable {
    by_product: BTreeMap<i64, BTreeMap<CostType, Vec<Discount>>>,
}

impl DiscountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the server payload. Unknown cost type keys are skipped.
    pub fn from_products(products: Vec<ProductDiscounts>) -> Self {
        let mut table = Self::new();
        for product in products {
            let entry = table.by_product.entry(product.id).or_default();
            for (code, discounts) in product.discounts {
                match code.trim().parse().ok().and_then(CostType::from_code) {
                    Some(cost_type) => {
                        entry.insert(cost_type, discounts);
                    }
                    None => {
                        tracing::debug!(
                            product_id = product.id,
                            %code,
                            "Unknown cost type in discounts"
                        );
                    }
                }
            }
        }
        table
    }

    pub fn insert(&mut self, product_id: i64, cost_type: CostType, discounts: Vec<Discount>) {
        self.by_product
            .entry(product_id)
            .or_default()
            .insert(cost_type, discounts);
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }

    /// Discounts offered for the product at the cost type; empty when either
    /// is unknown.
    pub fn resolve(&self, product_id: i64, cost_type: CostType) -> &[Discount] {
        self.by_product
            .get(&product_id)
            .and_then(|by_cost| by_cost.get(&cost_type))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn offers(&self, product_id: i64, cost_type: CostType) -> Vec<DiscountOffer> {
        self.resolve(product_id, cost_type)
            .iter()
            .map(|discount| DiscountOffer {
                id: discount.id,
                name: discount.name.clone(),
                cost_type,
                product_id,
            })
            .collect()
    }

    /// Discount options for a row's product and cost type.
    pub fn options(&self, product_id: Option<i64>, cost_type: CostType) -> Vec<SelectOption> {
        let Some(product_id) = product_id else {
            return Vec::new();
        };
        self.offers(product_id, cost_type)
            .iter()
            .map(DiscountOffer::to_option)
            .collect()
    }
}
