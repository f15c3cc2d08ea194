//! Shared storage integration tests.
//!
//! Tests the UserStore and ProductCatalog interfaces against all
//! implementations. Each implementation module imports these test functions
//! and runs them.

pub mod catalog_tests;
pub mod user_store_tests;
