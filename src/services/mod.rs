//! Engine operations.
//!
//! One manager per area of the user document. Managers share a
//! [`UserRepository`](crate::repository::UserRepository) and hold no user
//! state of their own; every operation re-reads before it writes.

pub mod address_book;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod instant_buy;
pub mod pricing;
mod storefront;

pub use address_book::AddressBook;
pub use cart::{CartManager, CartView};
pub use catalog::CatalogBrowser;
pub use checkout::CheckoutEngine;
pub use instant_buy::InstantBuyEngine;
pub use pricing::PriceAggregator;
pub use storefront::Storefront;
