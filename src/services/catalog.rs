//! Catalog browsing and seeding.

use tracing::info;

use crate::error::Result;
use crate::model::Product;
use crate::repository::UserRepository;
use crate::validation::validate_product;

/// Read access to the product catalog, plus admin seeding.
#[derive(Clone)]
pub struct CatalogBrowser {
    repo: UserRepository,
}

impl CatalogBrowser {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// All products, ordered by name.
    pub async fn list(&self) -> Result<Vec<Product>> {
        self.repo.list_products().await
    }

    /// Products whose name contains `fragment`, ignoring case.
    pub async fn search(&self, fragment: &str) -> Result<Vec<Product>> {
        self.repo.search_products(fragment.trim()).await
    }

    /// Add a product to the catalog.
    #[tracing::instrument(name = "catalog.add", skip_all, fields(product_id = %product.product_id))]
    pub async fn add_product(&self, product: Product) -> Result<Product> {
        validate_product(&product)?;
        self.repo.insert_product(product.clone()).await?;
        info!(name = %product.name, price = product.price, "Product added");
        Ok(product)
    }
}
