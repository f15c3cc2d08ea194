//! Acceptance tests using cucumber-rs (Gherkin).
//!
//! Scenarios run against the in-memory store with fault injection.

use std::collections::HashMap;
use std::sync::Arc;

use cucumber::{given, then, when, World};

use shopcore::model::{AddressFields, AddressSlot, Product, ProductId, UserId};
use shopcore::storage::{MemoryProductCatalog, MemoryUserStore, MutationKind, ProductCatalog};
use shopcore::{ShopError, Storefront};

#[derive(World)]
#[world(init = Self::new)]
pub struct ShopWorld {
    store: Arc<MemoryUserStore>,
    catalog: Arc<MemoryProductCatalog>,
    shop: Storefront,
    user_id: UserId,
    products: HashMap<String, ProductId>,
    last_error: Option<ShopError>,
}

impl std::fmt::Debug for ShopWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopWorld")
            .field("user_id", &self.user_id)
            .field("products", &self.products)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl ShopWorld {
    fn new() -> Self {
        let store = Arc::new(MemoryUserStore::new());
        let catalog = Arc::new(MemoryProductCatalog::new());
        Self {
            shop: Storefront::new(store.clone(), catalog.clone()),
            store,
            catalog,
            user_id: UserId::new(),
            products: HashMap::new(),
            last_error: None,
        }
    }

    fn product(&self, name: &str) -> ProductId {
        *self
            .products
            .get(name)
            .unwrap_or_else(|| panic!("unknown product {}", name))
    }

    fn record<T>(&mut self, result: Result<T, ShopError>) {
        self.last_error = result.err();
    }
}

fn address(city: &str) -> AddressFields {
    AddressFields {
        house: "5".into(),
        street: "Main".into(),
        city: city.into(),
        postal_code: "12345".into(),
    }
}

// Given

#[given("a registered user")]
async fn given_registered_user(world: &mut ShopWorld) {
    world.shop.register_user(world.user_id).await.unwrap();
}

#[given("a catalog with products:")]
async fn given_catalog(world: &mut ShopWorld, step: &cucumber::gherkin::Step) {
    if let Some(table) = &step.table {
        for row in table.rows.iter().skip(1) {
            let product = Product::new(row[0].clone(), row[1].parse().unwrap());
            world.products.insert(row[0].clone(), product.product_id);
            world.catalog.insert(product).await.unwrap();
        }
    }
}

#[given(expr = "the cart holds {word}")]
async fn given_cart_holds_one(world: &mut ShopWorld, name: String) {
    let product_id = world.product(&name);
    world.shop.cart().add(world.user_id, product_id).await.unwrap();
}

#[given(expr = "the cart holds {word} and {word}")]
async fn given_cart_holds_two(world: &mut ShopWorld, first: String, second: String) {
    for name in [first, second] {
        let product_id = world.product(&name);
        world.shop.cart().add(world.user_id, product_id).await.unwrap();
    }
}

#[given("clearing the cart is failing")]
async fn given_clear_failing(world: &mut ShopWorld) {
    world
        .store
        .faults()
        .fail_on_mutation(MutationKind::PullCartEntries);
}

// When

#[when(expr = "the user adds a {word} address")]
async fn when_add_address(world: &mut ShopWorld, city: String) {
    let result = world.shop.addresses().add(world.user_id, address(&city)).await;
    world.record(result);
}

#[when("the user adds another address")]
async fn when_add_another_address(world: &mut ShopWorld) {
    let result = world
        .shop
        .addresses()
        .add(world.user_id, address("elsewhere"))
        .await;
    world.record(result);
}

#[when("the user edits the work address")]
async fn when_edit_work(world: &mut ShopWorld) {
    let result = world
        .shop
        .addresses()
        .edit(world.user_id, AddressSlot::Work, address("office"))
        .await;
    world.record(result);
}

#[when("the user checks out")]
async fn when_checkout(world: &mut ShopWorld) {
    let result = world.shop.checkout().checkout(world.user_id).await;
    world.record(result);
}

#[when(expr = "the user instantly buys {word}")]
async fn when_instant_buy(world: &mut ShopWorld, name: String) {
    let product_id = world.product(&name);
    let result = world.shop.instant_buy().buy(world.user_id, product_id).await;
    world.record(result);
}

#[when(expr = "the user removes {word} from the cart")]
async fn when_remove(world: &mut ShopWorld, name: String) {
    let product_id = world.product(&name);
    let result = world.shop.cart().remove(world.user_id, product_id).await;
    world.record(result);
}

#[when("the user adds an unknown product to the cart")]
async fn when_add_unknown(world: &mut ShopWorld) {
    let result = world.shop.cart().add(world.user_id, ProductId::new()).await;
    world.record(result);
}

#[when("storage recovers")]
async fn when_storage_recovers(world: &mut ShopWorld) {
    world.store.faults().clear();
}

#[when("the pending orders are resumed")]
async fn when_resume_pending(world: &mut ShopWorld) {
    let pending = world.shop.checkout().pending(world.user_id).await.unwrap();
    for order in pending {
        let result = world.shop.checkout().resume(world.user_id, order.order_id).await;
        world.record(result);
    }
}

// Then

#[then("the request succeeds")]
async fn then_succeeds(world: &mut ShopWorld) {
    assert!(
        world.last_error.is_none(),
        "expected success, got {:?}",
        world.last_error
    );
}

#[then(expr = "the request fails with {string}")]
async fn then_fails_with(world: &mut ShopWorld, code: String) {
    let error = world
        .last_error
        .as_ref()
        .expect("Expected the request to fail, but it succeeded");
    assert_eq!(error.code(), code, "unexpected error: {}", error);
}

#[then(expr = "the user has {int} address(es)")]
async fn then_address_count(world: &mut ShopWorld, expected: usize) {
    let count = world.shop.addresses().count(world.user_id).await.unwrap();
    assert_eq!(count, expected);
}

#[then(expr = "the user has {int} order(s)")]
async fn then_order_count(world: &mut ShopWorld, expected: usize) {
    let doc = world.shop.user(world.user_id).await.unwrap();
    assert_eq!(doc.orders.len(), expected);
}

#[then(expr = "the user has {int} pending order(s)")]
async fn then_pending_count(world: &mut ShopWorld, expected: usize) {
    let pending = world.shop.checkout().pending(world.user_id).await.unwrap();
    assert_eq!(pending.len(), expected);
}

#[then(expr = "the cart total is {int}")]
async fn then_cart_total(world: &mut ShopWorld, expected: i64) {
    let view = world.shop.cart().view(world.user_id).await.unwrap();
    assert_eq!(view.total, expected);
}

#[then("the cart is empty")]
async fn then_cart_empty(world: &mut ShopWorld) {
    let view = world.shop.cart().view(world.user_id).await.unwrap();
    assert!(view.entries.is_empty());
    assert_eq!(view.total, 0);
}

#[then(expr = "the latest order has price {int} and {int} items")]
async fn then_latest_order(world: &mut ShopWorld, price: i64, items: usize) {
    let doc = world.shop.user(world.user_id).await.unwrap();
    let order = doc.orders.last().expect("user should have an order");
    assert_eq!(order.price, price);
    assert_eq!(order.line_items.len(), items);
}

#[tokio::main]
async fn main() {
    ShopWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/acceptance/features")
        .await;
}
