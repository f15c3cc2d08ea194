//! MongoDB UserStore implementation.

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{IndexOptions, UpdateOptions};
use mongodb::{Collection, Database, IndexModel};
use tracing::debug;

use crate::model::{UserDocument, UserId};
use crate::storage::{
    GroupResult, Mutation, Pipeline, Result, StorageError, UserFilter, UserStore, USERS_COLLECTION,
};

use super::update::UpdateBuilder;
use super::{from_document, is_duplicate_key, to_document};

/// MongoDB implementation of UserStore.
///
/// One document per user, keyed by `_id`. Every update is filtered on the
/// expected `version` and increments it, so concurrent writers serialize
/// through the single-document atomicity MongoDB already provides.
pub struct MongoUserStore {
    users: Collection<Document>,
}

impl MongoUserStore {
    /// Create a new MongoDB user store over `collection`.
    pub async fn new(database: &Database, collection: &str) -> Result<Self> {
        let users = database.collection(collection);
        let store = Self { users };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        // Sweeps for interrupted checkouts filter on order stage
        let stage_index = IndexModel::builder()
            .keys(doc! { "orders.stage": 1 })
            .options(IndexOptions::builder().sparse(true).build())
            .build();
        self.users.create_index(stage_index).await?;
        Ok(())
    }

    fn not_found(user_id: UserId) -> StorageError {
        StorageError::NotFound {
            collection: USERS_COLLECTION,
            id: user_id.to_string(),
        }
    }

    /// Work out why a version-filtered update matched nothing.
    async fn diagnose_miss(&self, user_id: UserId, expected_version: u64) -> StorageError {
        let current = match self.users.find_one(doc! { "_id": user_id.to_string() }).await {
            Ok(current) => current,
            Err(e) => return StorageError::from(e),
        };
        match current {
            None => Self::not_found(user_id),
            Some(doc) => {
                let actual = doc.get_i64("version").unwrap_or_default() as u64;
                if actual != expected_version {
                    StorageError::VersionConflict {
                        expected: expected_version,
                        actual,
                    }
                } else {
                    StorageError::InvalidMutation(
                        "document does not satisfy mutation preconditions".to_string(),
                    )
                }
            }
        }
    }
}

fn pipeline_stages(user_id: UserId, pipeline: Pipeline) -> Vec<Document> {
    let matcher = doc! { "$match": { "_id": user_id.to_string() } };
    match pipeline {
        Pipeline::CountAddresses => vec![
            matcher,
            doc! { "$unwind": "$addresses" },
            doc! { "$group": { "_id": "$_id", "total": { "$sum": 1 } } },
        ],
        Pipeline::SumCart => vec![
            matcher,
            doc! { "$unwind": "$cart" },
            doc! { "$group": { "_id": "$_id", "total": { "$sum": "$cart.price" } } },
        ],
        Pipeline::SumOrderItems(order_id) => vec![
            matcher,
            doc! { "$unwind": "$orders" },
            doc! { "$match": { "orders.order_id": order_id.to_string() } },
            doc! { "$unwind": "$orders.line_items" },
            doc! { "$group": { "_id": "$_id", "total": { "$sum": "$orders.line_items.price" } } },
        ],
    }
}

fn filter_document(filter: UserFilter) -> Document {
    match filter {
        UserFilter::All => Document::new(),
        UserFilter::HasUnplacedOrders => {
            doc! { "orders.stage": { "$in": ["opened", "items_copied"] } }
        }
        UserFilter::CartContains(product_id) => {
            doc! { "cart.product_id": product_id.to_string() }
        }
    }
}

fn group_result(doc: &Document) -> Result<GroupResult> {
    let key = match doc.get("_id") {
        Some(Bson::String(key)) => key.clone(),
        other => {
            return Err(StorageError::Aggregation(format!(
                "unexpected group key {:?}",
                other
            )))
        }
    };
    let value = match doc.get("total") {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        // $sum widens to double once a long total overflows
        other => {
            return Err(StorageError::Aggregation(format!(
                "non-integer total {:?}",
                other
            )))
        }
    };
    Ok(GroupResult { key, value })
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn insert(&self, user: UserDocument) -> Result<()> {
        let user_id = user.user_id;
        let doc = to_document(&user)?;
        self.users.insert_one(doc).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StorageError::Duplicate {
                    collection: USERS_COLLECTION,
                    id: user_id.to_string(),
                }
            } else {
                StorageError::from(e)
            }
        })?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<UserDocument> {
        let found = self
            .users
            .find_one(doc! { "_id": user_id.to_string() })
            .await?;
        match found {
            Some(doc) => from_document(doc),
            None => Err(Self::not_found(user_id)),
        }
    }

    async fn update_by_id(
        &self,
        user_id: UserId,
        expected_version: u64,
        mutations: Vec<Mutation>,
    ) -> Result<u64> {
        let plan = UpdateBuilder::build(&mutations)?;

        let mut filter = doc! {
            "_id": user_id.to_string(),
            "version": expected_version as i64,
        };
        for (path, guard) in plan.guards {
            filter.insert(path, guard);
        }

        debug!(
            user_id = %user_id,
            expected_version,
            mutations = mutations.len(),
            "MongoDB versioned update"
        );

        let mut options = UpdateOptions::default();
        if !plan.array_filters.is_empty() {
            options.array_filters = Some(plan.array_filters);
        }

        let result = self
            .users
            .update_one(filter, plan.update)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(self.diagnose_miss(user_id, expected_version).await);
        }
        Ok(expected_version + 1)
    }

    async fn aggregate(&self, user_id: UserId, pipeline: Pipeline) -> Result<Vec<GroupResult>> {
        let mut cursor = self
            .users
            .aggregate(pipeline_stages(user_id, pipeline))
            .await?;

        let mut groups = Vec::new();
        while cursor.advance().await? {
            let doc = cursor.deserialize_current()?;
            groups.push(group_result(&doc)?);
        }
        Ok(groups)
    }

    async fn count_matching(&self, filter: UserFilter) -> Result<u64> {
        Ok(self.users.count_documents(filter_document(filter)).await?)
    }
}
