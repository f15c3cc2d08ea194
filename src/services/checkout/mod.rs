//! Checkout engine.
//!
//! Checkout turns the cart into an order in three writes against the user
//! document:
//!
//! 1. Append an `Opened` order priced from the cart. This is the commit
//!    point; before it nothing has changed.
//! 2. Copy the cart into the order and move it to `ItemsCopied`.
//! 3. Pull the copied entries out of the cart and move the order to
//!    `Placed`.
//!
//! Steps 2 and 3 each carry the stage change in the same write as the data
//! change, so the stage always tells which steps have landed. A checkout
//! interrupted after step 1 is finished by [`CheckoutEngine::resume`], which
//! re-applies whatever the stage says is missing.
//!
//! A user has at most one unplaced order. Opening is conditional on the
//! version of a document with no unplaced order, so of two concurrent
//! checkouts only one opens an order and the other sees it as pending.

use tracing::{info, warn};

use crate::error::{Result, ShopError};
use crate::model::{EntryId, Order, OrderId, OrderStage, UserDocument, UserId};
use crate::repository::UserRepository;
use crate::storage::Mutation;

use super::PriceAggregator;

/// Turns carts into orders.
#[derive(Clone)]
pub struct CheckoutEngine {
    repo: UserRepository,
}

/// Which completion writes landed during one call.
#[derive(Debug, Default, Clone, Copy)]
struct Progress {
    items_copied: bool,
    cart_cleared: bool,
}

impl CheckoutEngine {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    /// Place an order for everything in the cart.
    ///
    /// Fails with `CartEmpty` before writing anything when the cart is
    /// empty, and with `CheckoutPending` while another checkout for the user
    /// has an unplaced order. Once the order is appended, any later failure
    /// is reported as `CheckoutPartiallyApplied` and can be finished with
    /// [`Self::resume`].
    ///
    /// A `Timeout` while appending the order does not prove the append was
    /// dropped: the store may have applied it after the budget ran out.
    /// Check [`Self::pending`] before retrying; a retry that finds the order
    /// fails with `CheckoutPending` naming it.
    #[tracing::instrument(name = "checkout", skip_all, fields(user_id = %user_id))]
    pub async fn checkout(&self, user_id: UserId) -> Result<Order> {
        let order = self.open_order(user_id).await?;
        let order_id = order.order_id;
        info!(order_id = %order_id, price = order.price, "Order opened");

        let mut progress = Progress::default();
        match self.complete(user_id, order_id, &mut progress).await {
            Ok(order) => {
                info!(
                    order_id = %order_id,
                    price = order.price,
                    items = order.line_items.len(),
                    "Order placed"
                );
                Ok(order)
            }
            Err(err) => Err(partial(order_id, progress, err)),
        }
    }

    /// Finish an interrupted checkout.
    ///
    /// Re-applies whichever completion steps the order's stage says are
    /// missing. A placed order is returned unchanged.
    #[tracing::instrument(name = "checkout.resume", skip_all, fields(user_id = %user_id, order_id = %order_id))]
    pub async fn resume(&self, user_id: UserId, order_id: OrderId) -> Result<Order> {
        let doc = self.repo.load(user_id).await?;
        let stage = doc
            .order(order_id)
            .map(|order| order.stage)
            .ok_or(ShopError::OrderNotFound {
                user: user_id,
                order: order_id,
            })?;
        info!(stage = ?stage, "Resuming checkout");

        let mut progress = Progress {
            items_copied: stage != OrderStage::Opened,
            cart_cleared: stage == OrderStage::Placed,
        };
        match self.complete(user_id, order_id, &mut progress).await {
            Ok(order) => Ok(order),
            Err(err @ (ShopError::OrderNotFound { .. } | ShopError::UserNotFound(_))) => Err(err),
            Err(err) => Err(partial(order_id, progress, err)),
        }
    }

    /// Orders whose checkout has not reached `Placed`.
    pub async fn pending(&self, user_id: UserId) -> Result<Vec<Order>> {
        let doc = self.repo.load(user_id).await?;
        Ok(doc
            .orders
            .into_iter()
            .filter(|order| !order.is_placed())
            .collect())
    }

    /// Steps 1 to 4: read the cart, price it, append the order.
    async fn open_order(&self, user_id: UserId) -> Result<Order> {
        self.repo
            .retry_on_conflict(user_id, "open_order", || async {
                let doc = self.repo.load(user_id).await?;
                if let Some(open) = doc.orders.iter().find(|order| !order.is_placed()) {
                    return Err(ShopError::CheckoutPending {
                        order_id: open.order_id,
                    });
                }
                if doc.cart.is_empty() {
                    return Err(ShopError::CartEmpty);
                }
                let total = PriceAggregator::compute_total(&doc.cart)?;
                let order = Order::open(total);

                self.repo
                    .write(user_id, doc.version, vec![Mutation::PushOrder(order.clone())])
                    .await
                    .map_err(|err| match err {
                        ShopError::Storage(source) => ShopError::OrderCreationFailed(source),
                        other => other,
                    })?;
                Ok(order)
            })
            .await
    }

    /// Drive an order to `Placed`, one stage at a time.
    async fn complete(
        &self,
        user_id: UserId,
        order_id: OrderId,
        progress: &mut Progress,
    ) -> Result<Order> {
        loop {
            let step = self
                .repo
                .retry_on_conflict(user_id, "complete_checkout", || async {
                    let doc = self.repo.load(user_id).await?;
                    self.advance(&doc, order_id).await
                })
                .await?;

            match step {
                Step::Copied => progress.items_copied = true,
                Step::Cleared => progress.cart_cleared = true,
                Step::Done(order) => return Ok(order),
            }
        }
    }

    /// Apply the next completion write for the order's current stage.
    async fn advance(&self, doc: &UserDocument, order_id: OrderId) -> Result<Step> {
        let user_id = doc.user_id;
        let order = doc.order(order_id).ok_or(ShopError::OrderNotFound {
            user: user_id,
            order: order_id,
        })?;

        match order.stage {
            OrderStage::Placed => Ok(Step::Done(order.clone())),
            OrderStage::Opened => {
                let line_items = doc.cart.clone();
                let price = PriceAggregator::compute_total(&line_items)?;
                if price != order.price {
                    warn!(
                        order_id = %order_id,
                        opened_at = order.price,
                        copied = price,
                        "Cart changed between opening and copying, repricing order"
                    );
                }
                self.repo
                    .write(
                        user_id,
                        doc.version,
                        vec![
                            Mutation::AddOrderItems {
                                order_id,
                                line_items,
                                price,
                            },
                            Mutation::SetOrderStage {
                                order_id,
                                stage: OrderStage::ItemsCopied,
                            },
                        ],
                    )
                    .await?;
                Ok(Step::Copied)
            }
            OrderStage::ItemsCopied => {
                let copied: Vec<EntryId> =
                    order.line_items.iter().map(|item| item.entry_id).collect();
                self.repo
                    .write(
                        user_id,
                        doc.version,
                        vec![
                            Mutation::PullCartEntries(copied),
                            Mutation::SetOrderStage {
                                order_id,
                                stage: OrderStage::Placed,
                            },
                        ],
                    )
                    .await?;
                Ok(Step::Cleared)
            }
        }
    }
}

/// Result of one completion step.
enum Step {
    Copied,
    Cleared,
    Done(Order),
}

fn partial(order_id: OrderId, progress: Progress, err: ShopError) -> ShopError {
    warn!(
        order_id = %order_id,
        items_copied = progress.items_copied,
        cart_cleared = progress.cart_cleared,
        error = %err,
        "Checkout partially applied"
    );
    ShopError::CheckoutPartiallyApplied {
        order_id,
        items_copied: progress.items_copied,
        cart_cleared: progress.cart_cleared,
        reason: err.to_string(),
    }
}
