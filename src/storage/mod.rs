//! Storage implementations.
//!
//! The engine talks to persistence through two traits: [`UserStore`] for the
//! per-user document and [`ProductCatalog`] for read-mostly product data.
//! Backends are chosen at startup from [`StorageConfig`].

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageConfig, StorageType};

mod catalog;
pub mod helpers;
pub mod memory;
mod user_store;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use catalog::ProductCatalog;
pub use memory::{MemoryProductCatalog, MemoryUserStore};
pub use user_store::{
    GroupResult, Mutation, MutationKind, Pipeline, UserFilter, UserStore, PRODUCTS_COLLECTION,
    USERS_COLLECTION,
};

#[cfg(feature = "mongodb")]
pub use self::mongodb::{MongoProductCatalog, MongoUserStore};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Document not found: collection={collection}, id={id}")]
    NotFound { collection: &'static str, id: String },

    #[error("Document already exists: collection={collection}, id={id}")]
    Duplicate { collection: &'static str, id: String },

    #[error("Version conflict: expected {expected}, got {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),

    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] ::mongodb::error::Error),
}

/// Storage handles shared by every manager.
pub type StorageHandles = (Arc<dyn UserStore>, Arc<dyn ProductCatalog>);

/// Initialize storage based on configuration.
pub async fn init_storage(config: &StorageConfig) -> Result<StorageHandles> {
    match config.storage_type {
        StorageType::Memory => {
            info!("Storage: in-memory");
            Ok((
                Arc::new(MemoryUserStore::new()),
                Arc::new(MemoryProductCatalog::new()),
            ))
        }
        #[cfg(feature = "mongodb")]
        StorageType::Mongodb => {
            let mongo = &config.mongodb;
            info!(uri = %mongo.uri, database = %mongo.database, "Storage: MongoDB");
            let client = ::mongodb::Client::with_uri_str(&mongo.uri).await?;
            let database = client.database(&mongo.database);

            let users = MongoUserStore::new(&database, &mongo.users_collection).await?;
            let products = MongoProductCatalog::new(&database, &mongo.products_collection).await?;

            Ok((Arc::new(users), Arc::new(products)))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageType::Mongodb => {
            tracing::error!("MongoDB storage requested but 'mongodb' feature is not enabled");
            Err(StorageError::Unavailable(
                "MongoDB feature not enabled".to_string(),
            ))
        }
    }
}
