//! shopcore - Cart/Order State Engine
//!
//! Transactional core of a shopping cart: per-user address book, cart and
//! order history kept in one document per user, mutated under optimistic
//! concurrency on a document version.

pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod services;
pub mod storage;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use error::{Result, ShopError};
pub use services::Storefront;
