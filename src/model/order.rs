//! Orders in a user's history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::OrderId;
use super::line_item::LineItem;

/// How an order is paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
}

/// Progress of an order through checkout.
///
/// Checkout writes the order first, then copies the cart, then clears it.
/// The stage records which of those writes have landed so completion can be
/// re-applied without duplicating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStage {
    /// Appended to history, line items not yet copied.
    Opened,
    /// Line items copied, cart not yet cleared.
    ItemsCopied,
    /// Fully placed. Never modified again.
    Placed,
}

/// An order in a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub ordered_at: DateTime<Utc>,
    pub price: i64,
    pub payment_method: PaymentMethod,
    pub line_items: Vec<LineItem>,
    pub stage: OrderStage,
}

impl Order {
    /// An order opened by checkout, awaiting its line items.
    pub fn open(price: i64) -> Self {
        Self {
            order_id: OrderId::new(),
            ordered_at: Utc::now(),
            price,
            payment_method: PaymentMethod::CashOnDelivery,
            line_items: Vec::new(),
            stage: OrderStage::Opened,
        }
    }

    /// A complete order carrying its line items from the start.
    pub fn placed(price: i64, line_items: Vec<LineItem>) -> Self {
        Self {
            order_id: OrderId::new(),
            ordered_at: Utc::now(),
            price,
            payment_method: PaymentMethod::CashOnDelivery,
            line_items,
            stage: OrderStage::Placed,
        }
    }

    pub fn is_placed(&self) -> bool {
        self.stage == OrderStage::Placed
    }
}
