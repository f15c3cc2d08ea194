//! Cart manager.

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::model::{LineItem, ProductId, UserId};
use crate::repository::{Change, UserRepository};
use crate::storage::Mutation;

use super::PriceAggregator;

/// Cart entries with their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub entries: Vec<LineItem>,
    pub total: i64,
}

/// Manages cart contents.
#[derive(Clone)]
pub struct CartManager {
    repo: UserRepository,
    pricing: PriceAggregator,
}

impl CartManager {
    pub fn new(repo: UserRepository) -> Self {
        Self {
            pricing: PriceAggregator::new(repo.clone()),
            repo,
        }
    }

    /// Append one entry for a catalog product.
    ///
    /// Adding a product already in the cart adds another entry; each entry
    /// is one unit.
    #[tracing::instrument(name = "cart.add", skip_all, fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<LineItem> {
        let product = self.repo.product(product_id).await?;
        let item = LineItem::from_product(&product);

        self.repo
            .mutate(user_id, "add_to_cart", |_| {
                Ok(Change::Apply {
                    mutations: vec![Mutation::PushCartItem(item.clone())],
                    output: (),
                })
            })
            .await?;

        info!(entry_id = %item.entry_id, price = item.price, "Added to cart");
        Ok(item)
    }

    /// Remove every entry for a product. Returns how many were removed.
    ///
    /// Removing a product that is not in the cart succeeds without writing.
    #[tracing::instrument(name = "cart.remove", skip_all, fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<usize> {
        let removed = self
            .repo
            .mutate(user_id, "remove_from_cart", |doc| {
                let matching = doc
                    .cart
                    .iter()
                    .filter(|item| item.product_id == product_id)
                    .count();
                if matching == 0 {
                    return Ok(Change::Unchanged(0));
                }
                Ok(Change::Apply {
                    mutations: vec![Mutation::PullCartProduct(product_id)],
                    output: matching,
                })
            })
            .await?;

        info!(removed, "Removed from cart");
        Ok(removed)
    }

    /// Cart entries with the total computed by the store.
    pub async fn view(&self, user_id: UserId) -> Result<CartView> {
        let entries = self.repo.load(user_id).await?.cart;
        let total = self.pricing.cart_total(user_id).await?;
        Ok(CartView { entries, total })
    }
}
