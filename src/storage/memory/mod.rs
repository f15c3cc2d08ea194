//! In-memory storage implementations.
//!
//! Full implementations of the storage contracts, including version
//! compare-and-swap and aggregation, backed by `RwLock<HashMap>`. Used for
//! tests and for running without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{Product, ProductId, UserDocument, UserId};

use super::helpers::{apply_mutations, evaluate_pipeline, matches_filter, name_matches};
use super::{
    GroupResult, Mutation, Pipeline, ProductCatalog, Result, StorageError, UserFilter, UserStore,
    PRODUCTS_COLLECTION, USERS_COLLECTION,
};

#[cfg(any(test, feature = "test-utils"))]
mod faults;

#[cfg(any(test, feature = "test-utils"))]
pub use faults::Faults;

/// In-memory user document store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, UserDocument>>,
    #[cfg(any(test, feature = "test-utils"))]
    faults: Faults,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fault injection hooks.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    #[cfg(any(test, feature = "test-utils"))]
    async fn before_read(&self) -> Result<()> {
        self.faults.delay().await;
        Ok(())
    }

    #[cfg(not(any(test, feature = "test-utils")))]
    async fn before_read(&self) -> Result<()> {
        Ok(())
    }

    #[cfg(any(test, feature = "test-utils"))]
    async fn before_write(&self, mutations: &[Mutation]) -> Result<()> {
        self.faults.delay().await;
        self.faults.check_write(mutations)
    }

    #[cfg(not(any(test, feature = "test-utils")))]
    async fn before_write(&self, _mutations: &[Mutation]) -> Result<()> {
        Ok(())
    }

    #[cfg(any(test, feature = "test-utils"))]
    fn take_injected_conflict(&self) -> bool {
        self.faults.take_conflict()
    }

    #[cfg(not(any(test, feature = "test-utils")))]
    fn take_injected_conflict(&self) -> bool {
        false
    }
}

fn user_not_found(user_id: UserId) -> StorageError {
    StorageError::NotFound {
        collection: USERS_COLLECTION,
        id: user_id.to_string(),
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: UserDocument) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) {
            return Err(StorageError::Duplicate {
                collection: USERS_COLLECTION,
                id: user.user_id.to_string(),
            });
        }
        users.insert(user.user_id, user);
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<UserDocument> {
        self.before_read().await?;
        let users = self.users.read().await;
        users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| user_not_found(user_id))
    }

    async fn update_by_id(
        &self,
        user_id: UserId,
        expected_version: u64,
        mutations: Vec<Mutation>,
    ) -> Result<u64> {
        self.before_write(&mutations).await?;
        let mut users = self.users.write().await;
        let doc = users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))?;

        if doc.version != expected_version || self.take_injected_conflict() {
            return Err(StorageError::VersionConflict {
                expected: expected_version,
                actual: doc.version,
            });
        }

        let mut next = apply_mutations(doc, &mutations)?;
        next.version = doc.version + 1;
        let version = next.version;
        *doc = next;
        Ok(version)
    }

    async fn aggregate(&self, user_id: UserId, pipeline: Pipeline) -> Result<Vec<GroupResult>> {
        self.before_read().await?;
        let users = self.users.read().await;
        match users.get(&user_id) {
            Some(doc) => evaluate_pipeline(doc, pipeline),
            // $match on an unknown id produces nothing to group.
            None => Ok(Vec::new()),
        }
    }

    async fn count_matching(&self, filter: UserFilter) -> Result<u64> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|doc| matches_filter(doc, filter))
            .count() as u64)
    }
}

/// In-memory product catalog.
#[derive(Default)]
pub struct MemoryProductCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl MemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with products.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let map = products
            .into_iter()
            .map(|p| (p.product_id, p))
            .collect::<HashMap<_, _>>();
        Self {
            products: RwLock::new(map),
        }
    }
}

#[async_trait]
impl ProductCatalog for MemoryProductCatalog {
    async fn lookup(&self, product_id: ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<()> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.product_id) {
            return Err(StorageError::Duplicate {
                collection: PRODUCTS_COLLECTION,
                id: product.product_id.to_string(),
            });
        }
        products.insert(product.product_id, product);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let mut products: Vec<_> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn search(&self, fragment: &str) -> Result<Vec<Product>> {
        let mut products: Vec<_> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| name_matches(&p.name, fragment))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }
}
