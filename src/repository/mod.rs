//! Domain repositories.

mod user;

pub use user::{Change, UserRepository};
