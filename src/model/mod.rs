//! Domain model for users, carts and orders.
//!
//! A user document embeds its address book, cart and order history. Products
//! belong to the catalog and are referenced from line items by identifier.

mod address;
mod ids;
mod line_item;
mod order;
mod product;
mod user;

pub use address::{Address, AddressFields, AddressSlot, MAX_ADDRESSES};
pub use ids::{AddressId, EntryId, IdError, OrderId, ProductId, UserId};
pub use line_item::LineItem;
pub use order::{Order, OrderStage, PaymentMethod};
pub use product::Product;
pub use user::UserDocument;
