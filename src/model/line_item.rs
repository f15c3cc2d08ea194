//! Cart and order line items.

use serde::{Deserialize, Serialize};

use super::ids::{EntryId, ProductId};
use super::product::Product;

/// Denormalized product snapshot held in a cart or an order.
///
/// Each entry stands for one unit; repeated entries for the same product
/// express quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub entry_id: EntryId,
    pub product_id: ProductId,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub image: String,
}

impl LineItem {
    /// Snapshot a product into a fresh cart entry.
    pub fn from_product(product: &Product) -> Self {
        Self {
            entry_id: EntryId::new(),
            product_id: product.product_id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}
