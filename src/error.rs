//! Engine errors.
//!
//! Every operation returns [`ShopError`]. Storage failures are classified
//! into domain variants by the repository layer; anything left over is
//! carried as [`ShopError::Storage`].

use std::time::Duration;

use crate::model::{AddressSlot, OrderId, ProductId, UserId};
use crate::storage::StorageError;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, ShopError>;

/// Client-facing messages.
///
/// Internal detail such as driver errors stays in the `Display` form and
/// logs. Callers at a trust boundary should show `public_message` instead.
pub mod errmsg {
    pub const USER_NOT_FOUND: &str = "user not found";
    pub const PRODUCT_NOT_FOUND: &str = "product not found";
    pub const ORDER_NOT_FOUND: &str = "order not found";
    pub const SLOTS_FULL: &str = "address book is full";
    pub const SLOT_EMPTY: &str = "no address in that slot";
    pub const INVALID_IDENTIFIER: &str = "malformed identifier";
    pub const INVALID_PRODUCT: &str = "invalid product";
    pub const CART_EMPTY: &str = "cart is empty";
    pub const AGGREGATION_FAILED: &str = "could not compute total";
    pub const WRITE_CONFLICT: &str = "too many concurrent updates, try again";
    pub const ORDER_CREATION_FAILED: &str = "could not create order";
    pub const CHECKOUT_PARTIAL: &str = "checkout did not complete, it can be resumed";
    pub const CHECKOUT_PENDING: &str = "a checkout is already in progress";
    pub const TIMEOUT: &str = "operation timed out";
    pub const STORAGE: &str = "storage unavailable";
}

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Order not found: user={user}, order={order}")]
    OrderNotFound { user: UserId, order: OrderId },

    #[error("Address book full: at most {max} addresses")]
    SlotsFull { max: usize },

    #[error("No address in {0} slot")]
    SlotEmpty(AddressSlot),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Aggregation failed: {0}")]
    AggregationFailed(String),

    #[error("Write conflict on user {user}: retries exhausted")]
    WriteConflict { user: UserId },

    #[error("Order creation failed: {0}")]
    OrderCreationFailed(#[source] StorageError),

    #[error(
        "Checkout partially applied: order={order_id}, items_copied={items_copied}, cart_cleared={cart_cleared}: {reason}"
    )]
    CheckoutPartiallyApplied {
        order_id: OrderId,
        items_copied: bool,
        cart_cleared: bool,
        reason: String,
    },

    #[error("Checkout already in progress: order={order_id}")]
    CheckoutPending { order_id: OrderId },

    #[error("{operation} timed out after {budget:?}")]
    Timeout {
        operation: &'static str,
        budget: Duration,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ShopError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ShopError::UserNotFound(_) => "user_not_found",
            ShopError::ProductNotFound(_) => "product_not_found",
            ShopError::OrderNotFound { .. } => "order_not_found",
            ShopError::SlotsFull { .. } => "slots_full",
            ShopError::SlotEmpty(_) => "slot_empty",
            ShopError::InvalidIdentifier(_) => "invalid_identifier",
            ShopError::InvalidProduct(_) => "invalid_product",
            ShopError::CartEmpty => "cart_empty",
            ShopError::AggregationFailed(_) => "aggregation_failed",
            ShopError::WriteConflict { .. } => "write_conflict",
            ShopError::OrderCreationFailed(_) => "order_creation_failed",
            ShopError::CheckoutPartiallyApplied { .. } => "checkout_partially_applied",
            ShopError::CheckoutPending { .. } => "checkout_pending",
            ShopError::Timeout { .. } => "timeout",
            ShopError::Storage(_) => "storage",
        }
    }

    /// Message safe to show outside the process.
    pub fn public_message(&self) -> &'static str {
        match self {
            ShopError::UserNotFound(_) => errmsg::USER_NOT_FOUND,
            ShopError::ProductNotFound(_) => errmsg::PRODUCT_NOT_FOUND,
            ShopError::OrderNotFound { .. } => errmsg::ORDER_NOT_FOUND,
            ShopError::SlotsFull { .. } => errmsg::SLOTS_FULL,
            ShopError::SlotEmpty(_) => errmsg::SLOT_EMPTY,
            ShopError::InvalidIdentifier(_) => errmsg::INVALID_IDENTIFIER,
            ShopError::InvalidProduct(_) => errmsg::INVALID_PRODUCT,
            ShopError::CartEmpty => errmsg::CART_EMPTY,
            ShopError::AggregationFailed(_) => errmsg::AGGREGATION_FAILED,
            ShopError::WriteConflict { .. } => errmsg::WRITE_CONFLICT,
            ShopError::OrderCreationFailed(_) => errmsg::ORDER_CREATION_FAILED,
            ShopError::CheckoutPartiallyApplied { .. } => errmsg::CHECKOUT_PARTIAL,
            ShopError::CheckoutPending { .. } => errmsg::CHECKOUT_PENDING,
            ShopError::Timeout { .. } => errmsg::TIMEOUT,
            ShopError::Storage(_) => errmsg::STORAGE,
        }
    }

    /// Whether the caller may retry the whole operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShopError::WriteConflict { .. } | ShopError::Timeout { .. } | ShopError::Storage(_)
        )
    }
}

impl From<crate::model::IdError> for ShopError {
    fn from(err: crate::model::IdError) -> Self {
        ShopError::InvalidIdentifier(err.to_string())
    }
}
