//! ProductCatalog interface tests.
//!
//! These tests verify the contract of the ProductCatalog trait.
//! Each storage implementation should run these tests.

use shopcore::model::{Product, ProductId};
use shopcore::storage::{ProductCatalog, StorageError};

/// Product whose name carries a token unique to this run.
pub fn make_product(prefix: &str, price: i64) -> Product {
    Product::new(format!("{} {}", prefix, ProductId::new()), price)
}

pub async fn test_insert_and_lookup<C: ProductCatalog + ?Sized>(catalog: &C) {
    let mut product = make_product("Lantern", 42);
    product.category = "outdoor".into();
    product.rating = 4;

    catalog
        .insert(product.clone())
        .await
        .expect("insert should succeed");

    let found = catalog
        .lookup(product.product_id)
        .await
        .expect("lookup should succeed")
        .expect("product should exist");
    assert_eq!(found, product);
}

pub async fn test_lookup_missing<C: ProductCatalog + ?Sized>(catalog: &C) {
    let found = catalog.lookup(ProductId::new()).await.unwrap();
    assert!(found.is_none());
}

pub async fn test_insert_duplicate<C: ProductCatalog + ?Sized>(catalog: &C) {
    let product = make_product("Compass", 15);
    catalog.insert(product.clone()).await.unwrap();
    let result = catalog.insert(product).await;
    assert!(matches!(result, Err(StorageError::Duplicate { .. })));
}

pub async fn test_search_ignores_case<C: ProductCatalog + ?Sized>(catalog: &C) {
    let token = ProductId::new().to_string();
    let wanted = Product::new(format!("Kettle {}", token), 30);
    catalog.insert(wanted.clone()).await.unwrap();
    catalog.insert(make_product("Teapot", 20)).await.unwrap();

    let found = catalog.search(&token.to_uppercase()).await.unwrap();
    assert_eq!(found, vec![wanted]);
}

pub async fn test_search_is_literal<C: ProductCatalog + ?Sized>(catalog: &C) {
    let token = ProductId::new().to_string();
    catalog
        .insert(Product::new(format!("axb {}", token), 1))
        .await
        .unwrap();

    let found = catalog.search(&format!("a.b {}", token)).await.unwrap();
    assert!(found.is_empty(), "regex metacharacters match literally");
}

pub async fn test_list_includes_inserted<C: ProductCatalog + ?Sized>(catalog: &C) {
    let product = make_product("Hammock", 80);
    catalog.insert(product.clone()).await.unwrap();

    let all = catalog.list().await.unwrap();
    assert!(all.contains(&product));
    let names: Vec<_> = all.iter().map(|p| p.name.clone()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted, "list is ordered by name");
}

/// Run all ProductCatalog tests against a catalog implementation.
#[macro_export]
macro_rules! run_catalog_tests {
    ($catalog:expr) => {
        use $crate::storage::catalog_tests::*;

        test_insert_and_lookup($catalog).await;
        println!("  test_insert_and_lookup: PASSED");

        test_lookup_missing($catalog).await;
        println!("  test_lookup_missing: PASSED");

        test_insert_duplicate($catalog).await;
        println!("  test_insert_duplicate: PASSED");

        test_search_ignores_case($catalog).await;
        println!("  test_search_ignores_case: PASSED");

        test_search_is_literal($catalog).await;
        println!("  test_search_is_literal: PASSED");

        test_list_includes_inserted($catalog).await;
        println!("  test_list_includes_inserted: PASSED");
    };
}
