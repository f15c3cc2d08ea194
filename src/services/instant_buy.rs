//! Instant-buy engine.

use tracing::info;

use crate::error::Result;
use crate::model::{LineItem, Order, ProductId, UserId};
use crate::repository::{Change, UserRepository};
use crate::storage::Mutation;

/// Places single-product orders without going through the cart.
#[derive(Clone)]
pub struct InstantBuyEngine {
    repo: UserRepository,
}

impl InstantBuyEngine {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Buy one unit of a product.
    ///
    /// The order is complete when appended, in a single write. The cart is
    /// never read or written.
    #[tracing::instrument(name = "instant_buy", skip_all, fields(user_id = %user_id, product_id = %product_id))]
    pub async fn buy(&self, user_id: UserId, product_id: ProductId) -> Result<Order> {
        let product = self.repo.product(product_id).await?;
        let order = Order::placed(product.price, vec![LineItem::from_product(&product)]);

        self.repo
            .mutate(user_id, "instant_buy", |_| {
                Ok(Change::Apply {
                    mutations: vec![Mutation::PushOrder(order.clone())],
                    output: (),
                })
            })
            .await?;

        info!(order_id = %order.order_id, price = order.price, "Instant order placed");
        Ok(order)
    }
}
