//! Catalog products.

use serde::{Deserialize, Serialize};

use super::ids::ProductId;

/// A catalog product. Prices are integer currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub image: String,
}

impl Product {
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            product_id: ProductId::new(),
            name: name.into(),
            price,
            category: String::new(),
            rating: 0,
            image: String::new(),
        }
    }
}
