//! Storefront facade.
//!
//! Bundles every manager over one repository so a transport layer can hold
//! a single handle.
//!
//! # Example
//!
//! ```ignore
//! use shopcore::{Config, Storefront};
//!
//! let shop = Storefront::from_config(&Config::load(None)?).await?;
//! shop.register_user(user_id).await?;
//! shop.cart().add(user_id, product_id).await?;
//! let order = shop.checkout().checkout(user_id).await?;
//! ```

use std::sync::Arc;

use tokio::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::model::{UserDocument, UserId};
use crate::repository::UserRepository;
use crate::storage::{init_storage, ProductCatalog, UserFilter, UserStore};

use super::{
    AddressBook, CartManager, CatalogBrowser, CheckoutEngine, InstantBuyEngine, PriceAggregator,
};

/// Entry point to every engine operation.
#[derive(Clone)]
pub struct Storefront {
    repo: UserRepository,
    addresses: AddressBook,
    cart: CartManager,
    checkout: CheckoutEngine,
    instant_buy: InstantBuyEngine,
    catalog: CatalogBrowser,
    pricing: PriceAggregator,
}

impl Storefront {
    /// Create a storefront with default timeouts and retry policy.
    pub fn new(users: Arc<dyn UserStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self::from_repository(UserRepository::new(users, catalog))
    }

    /// Create a storefront over injected stores, with policies from config.
    pub fn with_config(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn ProductCatalog>,
        config: &Config,
    ) -> Self {
        Self::from_repository(UserRepository::with_config(
            users,
            catalog,
            config.timeouts.clone(),
            config.retry.clone(),
        ))
    }

    /// Connect the configured backend and build a storefront over it.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let (users, catalog) = init_storage(&config.storage).await?;
        info!(storage = ?config.storage.storage_type, "Storefront ready");
        Ok(Self::with_config(users, catalog, config))
    }

    fn from_repository(repo: UserRepository) -> Self {
        Self {
            addresses: AddressBook::new(repo.clone()),
            cart: CartManager::new(repo.clone()),
            checkout: CheckoutEngine::new(repo.clone()),
            instant_buy: InstantBuyEngine::new(repo.clone()),
            catalog: CatalogBrowser::new(repo.clone()),
            pricing: PriceAggregator::new(repo.clone()),
            repo,
        }
    }

    /// Copy of this storefront whose operations all finish by `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self::from_repository(self.repo.with_deadline(deadline))
    }

    /// Create an empty user document. Signup itself happens elsewhere.
    pub async fn register_user(&self, user_id: UserId) -> Result<()> {
        self.repo.insert(UserDocument::new(user_id)).await?;
        info!(user_id = %user_id, "User registered");
        Ok(())
    }

    /// Read a user's whole document.
    pub async fn user(&self, user_id: UserId) -> Result<UserDocument> {
        self.repo.load(user_id).await
    }

    /// Number of users with a checkout that has not reached `Placed`.
    pub async fn users_with_pending_orders(&self) -> Result<u64> {
        self.repo.count_matching(UserFilter::HasUnplacedOrders).await
    }

    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    pub fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub fn checkout(&self) -> &CheckoutEngine {
        &self.checkout
    }

    pub fn instant_buy(&self) -> &InstantBuyEngine {
        &self.instant_buy
    }

    pub fn catalog(&self) -> &CatalogBrowser {
        &self.catalog
    }

    pub fn pricing(&self) -> &PriceAggregator {
        &self.pricing
    }
}
