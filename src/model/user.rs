//! The per-user document.

use serde::{Deserialize, Serialize};

use super::address::Address;
use super::ids::{OrderId, UserId};
use super::line_item::LineItem;
use super::order::Order;

/// A user's embedded address book, cart and order history.
///
/// `version` increases by one on every successful write and is the
/// compare-and-swap token for conditional updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub user_id: UserId,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub cart: Vec<LineItem>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub version: u64,
}

impl UserDocument {
    /// An empty document for a newly signed-up user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            addresses: Vec::new(),
            cart: Vec::new(),
            orders: Vec::new(),
            version: 0,
        }
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == order_id)
    }

    pub fn order_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.order_id == order_id)
    }
}
