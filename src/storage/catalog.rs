//! ProductCatalog trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::{Product, ProductId};

/// Interface for the product catalog.
///
/// The engine only reads from the catalog; `insert` exists for seeding.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Look up a product. `None` when the id is unknown.
    async fn lookup(&self, product_id: ProductId) -> Result<Option<Product>>;

    /// Add a product. Fails with `Duplicate` if the id exists.
    async fn insert(&self, product: Product) -> Result<()>;

    /// All products.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Products whose name contains `fragment`, case-insensitively.
    async fn search(&self, fragment: &str) -> Result<Vec<Product>>;
}
