//! MongoDB ProductCatalog implementation.

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};

use crate::model::{Product, ProductId};
use crate::storage::{ProductCatalog, Result, StorageError, PRODUCTS_COLLECTION};

use super::{from_document, is_duplicate_key, to_document};

/// MongoDB implementation of ProductCatalog.
pub struct MongoProductCatalog {
    products: Collection<Document>,
}

impl MongoProductCatalog {
    /// Create a new MongoDB product catalog over `collection`.
    pub async fn new(database: &Database, collection: &str) -> Result<Self> {
        let products = database.collection(collection);
        let catalog = Self { products };
        catalog.init().await?;
        Ok(catalog)
    }

    async fn init(&self) -> Result<()> {
        let id_index = IndexModel::builder()
            .keys(doc! { "product_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.products.create_index(id_index).await?;

        let name_index = IndexModel::builder().keys(doc! { "name": 1 }).build();
        self.products.create_index(name_index).await?;

        Ok(())
    }

    async fn find_sorted(&self, filter: Document) -> Result<Vec<Product>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let mut cursor = self.products.find(filter).with_options(options).await?;

        let mut products = Vec::new();
        while cursor.advance().await? {
            let mut doc = cursor.deserialize_current()?;
            doc.remove("_id");
            products.push(from_document(doc)?);
        }
        Ok(products)
    }
}

/// Escape regex metacharacters so a search fragment matches literally.
fn escape_regex(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl ProductCatalog for MongoProductCatalog {
    async fn lookup(&self, product_id: ProductId) -> Result<Option<Product>> {
        let found = self
            .products
            .find_one(doc! { "product_id": product_id.to_string() })
            .await?;
        match found {
            Some(mut doc) => {
                doc.remove("_id");
                Ok(Some(from_document(doc)?))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, product: Product) -> Result<()> {
        let product_id = product.product_id;
        let doc = to_document(&product)?;
        self.products.insert_one(doc).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StorageError::Duplicate {
                    collection: PRODUCTS_COLLECTION,
                    id: product_id.to_string(),
                }
            } else {
                StorageError::from(e)
            }
        })?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        self.find_sorted(Document::new()).await
    }

    async fn search(&self, fragment: &str) -> Result<Vec<Product>> {
        let filter = doc! {
            "name": { "$regex": escape_regex(fragment), "$options": "i" }
        };
        self.find_sorted(filter).await
    }
}
