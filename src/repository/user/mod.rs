//! User document repository.
//!
//! Wraps the user store and the product catalog with the policies every
//! engine operation shares: per-call timeouts capped by an optional caller
//! deadline, classification of storage failures into [`ShopError`], and
//! re-read-and-retry on version conflicts.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::{OperationTimeouts, RetryConfig};
use crate::error::{Result, ShopError};
use crate::model::{Product, ProductId, UserDocument, UserId};
use crate::storage::{
    GroupResult, Mutation, Pipeline, ProductCatalog, StorageError, UserFilter, UserStore,
};
use crate::utils::retry::{conflict_backoff, is_conflict};

/// Outcome of planning a change against a freshly read document.
pub enum Change<T> {
    /// Write the mutations, then return the output.
    Apply { mutations: Vec<Mutation>, output: T },
    /// Nothing to write.
    Unchanged(T),
}

/// Repository for user documents and catalog lookups.
#[derive(Clone)]
pub struct UserRepository {
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn ProductCatalog>,
    timeouts: OperationTimeouts,
    retry: RetryConfig,
    deadline: Option<Instant>,
}

impl UserRepository {
    /// Create a repository with default timeouts and retry policy.
    pub fn new(users: Arc<dyn UserStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self::with_config(
            users,
            catalog,
            OperationTimeouts::default(),
            RetryConfig::default(),
        )
    }

    pub fn with_config(
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn ProductCatalog>,
        timeouts: OperationTimeouts,
        retry: RetryConfig,
    ) -> Self {
        Self {
            users,
            catalog,
            timeouts,
            retry,
            deadline: None,
        }
    }

    /// Copy of this repository whose calls all finish by `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    /// Budget for one call: the configured budget, capped by the deadline.
    fn budget(&self, configured: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => configured.min(deadline.saturating_duration_since(Instant::now())),
            None => configured,
        }
    }

    async fn bounded<T, Fut>(
        &self,
        operation: &'static str,
        configured: Duration,
        call: Fut,
    ) -> std::result::Result<T, BoundedError>
    where
        Fut: Future<Output = crate::storage::Result<T>>,
    {
        let budget = self.budget(configured);
        if budget.is_zero() {
            warn!(operation, "Deadline already passed");
            return Err(BoundedError::Timeout(ShopError::Timeout { operation, budget }));
        }
        match tokio::time::timeout(budget, call).await {
            Ok(result) => result.map_err(BoundedError::Storage),
            Err(_) => {
                warn!(operation, ?budget, "Storage call timed out");
                Err(BoundedError::Timeout(ShopError::Timeout { operation, budget }))
            }
        }
    }

    /// Insert a new user document.
    pub async fn insert(&self, user: UserDocument) -> Result<()> {
        let user_id = user.user_id;
        self.bounded("insert_user", self.timeouts.write(), self.users.insert(user))
            .await
            .map_err(|e| e.classify(user_id))
    }

    /// Read a user document.
    pub async fn load(&self, user_id: UserId) -> Result<UserDocument> {
        self.bounded("load_user", self.timeouts.read(), self.users.find_by_id(user_id))
            .await
            .map_err(|e| e.classify(user_id))
    }

    /// Single compare-and-swap write. A version mismatch is `WriteConflict`.
    pub async fn write(
        &self,
        user_id: UserId,
        expected_version: u64,
        mutations: Vec<Mutation>,
    ) -> Result<u64> {
        debug!(
            user_id = %user_id,
            expected_version,
            kinds = ?mutations.iter().map(Mutation::kind).collect::<Vec<_>>(),
            "Writing user document"
        );
        self.bounded(
            "update_user",
            self.timeouts.write(),
            self.users.update_by_id(user_id, expected_version, mutations),
        )
        .await
        .map_err(|e| e.classify(user_id))
    }

    /// Run an aggregation pipeline over a user document.
    pub async fn aggregate(&self, user_id: UserId, pipeline: Pipeline) -> Result<Vec<GroupResult>> {
        self.bounded(
            "aggregate_user",
            self.timeouts.read(),
            self.users.aggregate(user_id, pipeline),
        )
        .await
        .map_err(|e| e.classify(user_id))
    }

    /// Count user documents matching a filter.
    pub async fn count_matching(&self, filter: UserFilter) -> Result<u64> {
        self.bounded("count_users", self.timeouts.read(), self.users.count_matching(filter))
            .await
            .map_err(BoundedError::into_shop_error)
    }

    /// Retry `attempt` from scratch while it fails with a version conflict.
    ///
    /// Each attempt must re-read whatever it writes against. Once the retry
    /// budget is spent the last `WriteConflict` is returned.
    pub async fn retry_on_conflict<T, F, Fut>(
        &self,
        user_id: UserId,
        operation: &'static str,
        attempt: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        attempt
            .retry(conflict_backoff(&self.retry))
            .when(is_conflict)
            .notify(|err: &ShopError, dur: Duration| {
                warn!(
                    user_id = %user_id,
                    operation,
                    error = %err,
                    delay = ?dur,
                    "Version conflict, retrying"
                );
            })
            .await
    }

    /// Read, plan, and conditionally write, retrying on conflict.
    pub async fn mutate<T, F>(&self, user_id: UserId, operation: &'static str, plan: F) -> Result<T>
    where
        F: Fn(&UserDocument) -> Result<Change<T>>,
    {
        self.retry_on_conflict(user_id, operation, || async {
            let doc = self.load(user_id).await?;
            match plan(&doc)? {
                Change::Apply { mutations, output } => {
                    self.write(user_id, doc.version, mutations).await?;
                    Ok(output)
                }
                Change::Unchanged(output) => Ok(output),
            }
        })
        .await
    }

    /// Look up a product; `ProductNotFound` when absent.
    pub async fn product(&self, product_id: ProductId) -> Result<Product> {
        let found = self
            .bounded(
                "lookup_product",
                self.timeouts.read(),
                self.catalog.lookup(product_id),
            )
            .await
            .map_err(BoundedError::into_shop_error)?;
        found.ok_or(ShopError::ProductNotFound(product_id))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        self.bounded("list_products", self.timeouts.read(), self.catalog.list())
            .await
            .map_err(BoundedError::into_shop_error)
    }

    pub async fn search_products(&self, fragment: &str) -> Result<Vec<Product>> {
        self.bounded(
            "search_products",
            self.timeouts.read(),
            self.catalog.search(fragment),
        )
        .await
        .map_err(BoundedError::into_shop_error)
    }

    pub async fn insert_product(&self, product: Product) -> Result<()> {
        self.bounded(
            "insert_product",
            self.timeouts.write(),
            self.catalog.insert(product),
        )
        .await
        .map_err(BoundedError::into_shop_error)
    }
}

/// Failure of a bounded storage call, before classification.
enum BoundedError {
    Timeout(ShopError),
    Storage(StorageError),
}

impl BoundedError {
    /// Classify a failure of a call against one user's document.
    fn classify(self, user_id: UserId) -> ShopError {
        match self {
            BoundedError::Timeout(e) => e,
            BoundedError::Storage(StorageError::NotFound { .. }) => ShopError::UserNotFound(user_id),
            BoundedError::Storage(StorageError::VersionConflict { .. }) => {
                ShopError::WriteConflict { user: user_id }
            }
            BoundedError::Storage(StorageError::Aggregation(msg)) => {
                ShopError::AggregationFailed(msg)
            }
            BoundedError::Storage(e) => ShopError::Storage(e),
        }
    }

    fn into_shop_error(self) -> ShopError {
        match self {
            BoundedError::Timeout(e) => e,
            BoundedError::Storage(e) => ShopError::Storage(e),
        }
    }
}
