//! UserStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::{
    Address, AddressFields, AddressSlot, EntryId, LineItem, Order, OrderId, OrderStage, ProductId,
    UserDocument, UserId,
};

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";
/// Collection holding catalog products.
pub const PRODUCTS_COLLECTION: &str = "products";

/// A single change to a user document.
///
/// An update carries a list of mutations that the store applies to one
/// document as a unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Append an address.
    PushAddress(Address),
    /// Overwrite the fields of an occupied slot.
    SetAddressFields {
        slot: AddressSlot,
        fields: AddressFields,
    },
    /// Replace the whole address list.
    ReplaceAddresses(Vec<Address>),
    /// Append an entry to the cart.
    PushCartItem(LineItem),
    /// Remove every cart entry for a product.
    PullCartProduct(ProductId),
    /// Remove specific cart entries.
    PullCartEntries(Vec<EntryId>),
    /// Append an order to the history.
    PushOrder(Order),
    /// Add line items to an order as a set keyed on entry identity, and set
    /// its price.
    AddOrderItems {
        order_id: OrderId,
        line_items: Vec<LineItem>,
        price: i64,
    },
    /// Move an order to a new checkout stage.
    SetOrderStage { order_id: OrderId, stage: OrderStage },
}

/// Discriminant of a [`Mutation`], used for logging and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    PushAddress,
    SetAddressFields,
    ReplaceAddresses,
    PushCartItem,
    PullCartProduct,
    PullCartEntries,
    PushOrder,
    AddOrderItems,
    SetOrderStage,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::PushAddress(_) => MutationKind::PushAddress,
            Mutation::SetAddressFields { .. } => MutationKind::SetAddressFields,
            Mutation::ReplaceAddresses(_) => MutationKind::ReplaceAddresses,
            Mutation::PushCartItem(_) => MutationKind::PushCartItem,
            Mutation::PullCartProduct(_) => MutationKind::PullCartProduct,
            Mutation::PullCartEntries(_) => MutationKind::PullCartEntries,
            Mutation::PushOrder(_) => MutationKind::PushOrder,
            Mutation::AddOrderItems { .. } => MutationKind::AddOrderItems,
            Mutation::SetOrderStage { .. } => MutationKind::SetOrderStage,
        }
    }
}

/// Aggregations the engine runs against a single user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Number of stored addresses.
    CountAddresses,
    /// Sum of cart entry prices.
    SumCart,
    /// Sum of line item prices in one order.
    SumOrderItems(OrderId),
}

/// One group emitted by an aggregation pipeline.
///
/// Pipelines group by user id, so a result set holds at most one group.
/// A document with nothing to aggregate yields no group at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupResult {
    pub key: String,
    pub value: i64,
}

/// Predicates for counting user documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFilter {
    All,
    /// Users holding an order that has not reached [`OrderStage::Placed`].
    HasUnplacedOrders,
    /// Users with at least one cart entry for the product.
    CartContains(ProductId),
}

/// Interface for user document persistence.
///
/// Implementations:
/// - `MemoryUserStore`: in-process storage for tests and local runs
/// - `MongoUserStore`: MongoDB storage
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user document. Fails with `Duplicate` if the key exists.
    async fn insert(&self, user: UserDocument) -> Result<()>;

    /// Fetch a user document. Fails with `NotFound` if the key does not resolve.
    async fn find_by_id(&self, user_id: UserId) -> Result<UserDocument>;

    /// Apply mutations if the stored version equals `expected_version`.
    ///
    /// Returns the new version. A version mismatch fails with
    /// `VersionConflict` and leaves the document untouched.
    async fn update_by_id(
        &self,
        user_id: UserId,
        expected_version: u64,
        mutations: Vec<Mutation>,
    ) -> Result<u64>;

    /// Run an aggregation over one user document.
    async fn aggregate(&self, user_id: UserId, pipeline: Pipeline) -> Result<Vec<GroupResult>>;

    /// Count documents matching a predicate.
    async fn count_matching(&self, filter: UserFilter) -> Result<u64>;
}
