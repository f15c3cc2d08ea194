//! UserStore interface tests.
//!
//! These tests verify the contract of the UserStore trait.
//! Each storage implementation should run these tests.

use shopcore::model::{
    Address, AddressFields, AddressSlot, LineItem, Order, OrderStage, Product, UserDocument,
    UserId,
};
use shopcore::storage::{Mutation, Pipeline, StorageError, UserFilter, UserStore};

/// Insert a fresh user and return its id.
pub async fn make_user<S: UserStore + ?Sized>(store: &S) -> UserId {
    let user_id = UserId::new();
    store
        .insert(UserDocument::new(user_id))
        .await
        .expect("insert should succeed");
    user_id
}

pub fn make_item(price: i64) -> LineItem {
    LineItem::from_product(&Product::new(format!("Item {}", price), price))
}

pub fn make_address(city: &str) -> Address {
    Address::new(AddressFields {
        house: "7".into(),
        street: "Harbor".into(),
        city: city.into(),
        postal_code: "10001".into(),
    })
}

// =============================================================================
// UserStore::insert / find_by_id tests
// =============================================================================

pub async fn test_insert_and_find<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;

    let doc = store
        .find_by_id(user_id)
        .await
        .expect("find should succeed");

    assert_eq!(doc.user_id, user_id);
    assert_eq!(doc.version, 0);
    assert!(doc.addresses.is_empty());
    assert!(doc.cart.is_empty());
    assert!(doc.orders.is_empty());
}

pub async fn test_find_missing<S: UserStore + ?Sized>(store: &S) {
    let result = store.find_by_id(UserId::new()).await;
    assert!(
        matches!(result, Err(StorageError::NotFound { .. })),
        "missing user should be NotFound"
    );
}

pub async fn test_insert_duplicate<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    let result = store.insert(UserDocument::new(user_id)).await;
    assert!(
        matches!(result, Err(StorageError::Duplicate { .. })),
        "second insert should be Duplicate"
    );
}

// =============================================================================
// UserStore::update_by_id tests
// =============================================================================

pub async fn test_update_increments_version<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;

    let v1 = store
        .update_by_id(user_id, 0, vec![Mutation::PushCartItem(make_item(10))])
        .await
        .expect("update should succeed");
    let v2 = store
        .update_by_id(user_id, v1, vec![Mutation::PushCartItem(make_item(25))])
        .await
        .expect("update should succeed");

    assert_eq!(v1, 1);
    assert_eq!(v2, 2);
    let doc = store.find_by_id(user_id).await.unwrap();
    assert_eq!(doc.version, 2);
    assert_eq!(doc.cart.len(), 2);
    assert_eq!(doc.cart[0].price, 10);
}

pub async fn test_stale_version_conflicts<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    store
        .update_by_id(user_id, 0, vec![Mutation::PushCartItem(make_item(1))])
        .await
        .unwrap();

    let result = store
        .update_by_id(user_id, 0, vec![Mutation::PushCartItem(make_item(2))])
        .await;

    match result {
        Err(StorageError::VersionConflict { expected, actual }) => {
            assert_eq!(expected, 0);
            assert_eq!(actual, 1);
        }
        other => panic!("expected VersionConflict, got {:?}", other),
    }
    assert_eq!(store.find_by_id(user_id).await.unwrap().cart.len(), 1);
}

pub async fn test_update_missing_user<S: UserStore + ?Sized>(store: &S) {
    let result = store
        .update_by_id(UserId::new(), 0, vec![Mutation::ReplaceAddresses(vec![])])
        .await;
    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

pub async fn test_pull_cart_product_removes_all_entries<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    let product = Product::new("Socks", 4);
    let other = make_item(9);
    store
        .update_by_id(
            user_id,
            0,
            vec![
                Mutation::PushCartItem(LineItem::from_product(&product)),
                Mutation::PushCartItem(other.clone()),
                Mutation::PushCartItem(LineItem::from_product(&product)),
            ],
        )
        .await
        .unwrap();

    store
        .update_by_id(user_id, 1, vec![Mutation::PullCartProduct(product.product_id)])
        .await
        .unwrap();

    assert_eq!(store.find_by_id(user_id).await.unwrap().cart, vec![other]);
}

pub async fn test_pull_cart_entries_removes_listed_only<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    let first = make_item(1);
    let second = make_item(2);
    store
        .update_by_id(
            user_id,
            0,
            vec![
                Mutation::PushCartItem(first.clone()),
                Mutation::PushCartItem(second.clone()),
            ],
        )
        .await
        .unwrap();

    store
        .update_by_id(user_id, 1, vec![Mutation::PullCartEntries(vec![first.entry_id])])
        .await
        .unwrap();

    assert_eq!(store.find_by_id(user_id).await.unwrap().cart, vec![second]);
}

pub async fn test_address_mutations<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    store
        .update_by_id(
            user_id,
            0,
            vec![
                Mutation::PushAddress(make_address("Home")),
                Mutation::PushAddress(make_address("Work")),
            ],
        )
        .await
        .unwrap();

    let mut fields = make_address("Office").fields;
    fields.house = "12B".into();
    store
        .update_by_id(
            user_id,
            1,
            vec![Mutation::SetAddressFields {
                slot: AddressSlot::Work,
                fields: fields.clone(),
            }],
        )
        .await
        .unwrap();

    let doc = store.find_by_id(user_id).await.unwrap();
    assert_eq!(doc.addresses[0].fields.city, "Home");
    assert_eq!(doc.addresses[1].fields, fields);

    store
        .update_by_id(user_id, 2, vec![Mutation::ReplaceAddresses(vec![])])
        .await
        .unwrap();
    assert!(store.find_by_id(user_id).await.unwrap().addresses.is_empty());
}

pub async fn test_set_missing_slot_fails_without_change<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;

    let result = store
        .update_by_id(
            user_id,
            0,
            vec![Mutation::SetAddressFields {
                slot: AddressSlot::Home,
                fields: AddressFields::default(),
            }],
        )
        .await;

    assert!(matches!(result, Err(StorageError::InvalidMutation(_))));
    let doc = store.find_by_id(user_id).await.unwrap();
    assert_eq!(doc.version, 0);
    assert!(doc.addresses.is_empty());
}

pub async fn test_order_population_is_idempotent<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    let items = vec![make_item(10), make_item(25)];
    let order = Order::open(35);
    let order_id = order.order_id;

    store
        .update_by_id(user_id, 0, vec![Mutation::PushOrder(order)])
        .await
        .unwrap();

    for version in 1..=2 {
        store
            .update_by_id(
                user_id,
                version,
                vec![
                    Mutation::AddOrderItems {
                        order_id,
                        line_items: items.clone(),
                        price: 35,
                    },
                    Mutation::SetOrderStage {
                        order_id,
                        stage: OrderStage::ItemsCopied,
                    },
                ],
            )
            .await
            .unwrap();
    }

    let doc = store.find_by_id(user_id).await.unwrap();
    let stored = doc.order(order_id).expect("order should exist");
    assert_eq!(stored.line_items, items);
    assert_eq!(stored.price, 35);
    assert_eq!(stored.stage, OrderStage::ItemsCopied);
}

// =============================================================================
// UserStore::aggregate tests
// =============================================================================

pub async fn test_sum_cart<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;

    let empty = store.aggregate(user_id, Pipeline::SumCart).await.unwrap();
    assert!(empty.is_empty(), "empty cart yields no group");

    store
        .update_by_id(
            user_id,
            0,
            vec![
                Mutation::PushCartItem(make_item(10)),
                Mutation::PushCartItem(make_item(25)),
            ],
        )
        .await
        .unwrap();

    let groups = store.aggregate(user_id, Pipeline::SumCart).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, user_id.to_string());
    assert_eq!(groups[0].value, 35);
}

pub async fn test_count_addresses<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    store
        .update_by_id(user_id, 0, vec![Mutation::PushAddress(make_address("Home"))])
        .await
        .unwrap();

    let groups = store
        .aggregate(user_id, Pipeline::CountAddresses)
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].value, 1);
}

pub async fn test_sum_order_items<S: UserStore + ?Sized>(store: &S) {
    let user_id = make_user(store).await;
    let order = Order::placed(12, vec![make_item(5), make_item(7)]);
    let order_id = order.order_id;
    store
        .update_by_id(
            user_id,
            0,
            vec![
                Mutation::PushOrder(Order::placed(100, vec![make_item(100)])),
                Mutation::PushOrder(order),
            ],
        )
        .await
        .unwrap();

    let groups = store
        .aggregate(user_id, Pipeline::SumOrderItems(order_id))
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].value, 12);
}

// =============================================================================
// UserStore::count_matching tests
// =============================================================================

pub async fn test_count_cart_contains<S: UserStore + ?Sized>(store: &S) {
    let product = Product::new("Rare", 3);
    let filter = UserFilter::CartContains(product.product_id);
    assert_eq!(store.count_matching(filter).await.unwrap(), 0);

    let user_id = make_user(store).await;
    store
        .update_by_id(
            user_id,
            0,
            vec![Mutation::PushCartItem(LineItem::from_product(&product))],
        )
        .await
        .unwrap();

    assert_eq!(store.count_matching(filter).await.unwrap(), 1);
}

pub async fn test_count_unplaced_orders<S: UserStore + ?Sized>(store: &S) {
    let before = store
        .count_matching(UserFilter::HasUnplacedOrders)
        .await
        .unwrap();

    let user_id = make_user(store).await;
    let order = Order::open(1);
    let order_id = order.order_id;
    store
        .update_by_id(user_id, 0, vec![Mutation::PushOrder(order)])
        .await
        .unwrap();
    assert_eq!(
        store
            .count_matching(UserFilter::HasUnplacedOrders)
            .await
            .unwrap(),
        before + 1
    );

    store
        .update_by_id(
            user_id,
            1,
            vec![Mutation::SetOrderStage {
                order_id,
                stage: OrderStage::Placed,
            }],
        )
        .await
        .unwrap();
    assert_eq!(
        store
            .count_matching(UserFilter::HasUnplacedOrders)
            .await
            .unwrap(),
        before
    );
}

/// Run all UserStore tests against a store implementation.
#[macro_export]
macro_rules! run_user_store_tests {
    ($store:expr) => {
        use $crate::storage::user_store_tests::*;

        // insert / find
        test_insert_and_find($store).await;
        println!("  test_insert_and_find: PASSED");

        test_find_missing($store).await;
        println!("  test_find_missing: PASSED");

        test_insert_duplicate($store).await;
        println!("  test_insert_duplicate: PASSED");

        // update
        test_update_increments_version($store).await;
        println!("  test_update_increments_version: PASSED");

        test_stale_version_conflicts($store).await;
        println!("  test_stale_version_conflicts: PASSED");

        test_update_missing_user($store).await;
        println!("  test_update_missing_user: PASSED");

        test_pull_cart_product_removes_all_entries($store).await;
        println!("  test_pull_cart_product_removes_all_entries: PASSED");

        test_pull_cart_entries_removes_listed_only($store).await;
        println!("  test_pull_cart_entries_removes_listed_only: PASSED");

        test_address_mutations($store).await;
        println!("  test_address_mutations: PASSED");

        test_set_missing_slot_fails_without_change($store).await;
        println!("  test_set_missing_slot_fails_without_change: PASSED");

        test_order_population_is_idempotent($store).await;
        println!("  test_order_population_is_idempotent: PASSED");

        // aggregate
        test_sum_cart($store).await;
        println!("  test_sum_cart: PASSED");

        test_count_addresses($store).await;
        println!("  test_count_addresses: PASSED");

        test_sum_order_items($store).await;
        println!("  test_sum_order_items: PASSED");

        // count_matching
        test_count_cart_contains($store).await;
        println!("  test_count_cart_contains: PASSED");

        test_count_unplaced_orders($store).await;
        println!("  test_count_unplaced_orders: PASSED");
    };
}
