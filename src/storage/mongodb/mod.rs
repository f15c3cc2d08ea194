//! MongoDB implementations of storage interfaces.

mod catalog;
mod update;
mod user_store;

pub use catalog::MongoProductCatalog;
pub use user_store::MongoUserStore;

use mongodb::bson::Document;

use crate::storage::StorageError;

/// Mongo duplicate key error code.
const DUPLICATE_KEY: i32 = 11000;

/// Whether a driver error is a unique index violation.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(ref write_err))
            if write_err.code == DUPLICATE_KEY
    )
}

fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, StorageError> {
    mongodb::bson::to_document(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn to_bson<T: serde::Serialize>(value: &T) -> Result<mongodb::bson::Bson, StorageError> {
    mongodb::bson::to_bson(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> Result<T, StorageError> {
    mongodb::bson::from_document(doc).map_err(|e| StorageError::Serialization(e.to_string()))
}
