//! Integration tests for catalog writes.
//!
//! These tests require a `PostgreSQL` database at `TEST_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use rust_decimal::Decimal;

use routeclouds_api::services::catalog::{ProductDraft, ProductPatch};
use routeclouds_api::services::{CatalogError, CatalogService};
use routeclouds_core::MoneyError;
use routeclouds_integration_tests::{TestContext, unique_tag};

fn price(value: &str) -> Option<Decimal> {
    Some(Decimal::from_str(value).unwrap())
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_price_wider_than_column_is_rejected() {
    let ctx = TestContext::new().await;

    let err = CatalogService::new(&ctx.pool)
        .create_product(ProductDraft {
            name: Some(format!("Datacenter {}", unique_tag())),
            brand: None,
            category_id: None,
            price: price("100000000000.00"),
            description: None,
            specifications: None,
            images: None,
            stock: Some(1),
            featured: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidPrice(MoneyError::TooLarge)));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_reprice_beyond_column_leaves_product_unchanged() {
    let ctx = TestContext::new().await;
    let product = ctx.product("Edge Router", "450.00", 5).await;
    let catalog = CatalogService::new(&ctx.pool);

    let err = catalog
        .update_product(
            product.id,
            ProductPatch {
                price: price("10000000000.00"),
                stock: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidPrice(MoneyError::TooLarge)));

    let unchanged = catalog.get_product(product.id).await.unwrap();
    assert_eq!(unchanged.price.to_string(), "450.00");
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_largest_storable_price_round_trips() {
    let ctx = TestContext::new().await;
    let product = ctx.product("Supercomputer", "9999999999.99", 1).await;

    assert_eq!(product.price.to_string(), "9999999999.99");
}
