//! Integration tests for order placement.
//!
//! These tests require a `PostgreSQL` database at `TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p routeclouds-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::str::FromStr;

use rust_decimal::Decimal;

use routeclouds_api::services::catalog::ProductPatch;
use routeclouds_api::services::orders::CheckoutRequest;
use routeclouds_api::services::{CartService, CatalogService, OrderError, OrderService};
use routeclouds_core::{Money, OrderStatus, PaymentStatus};
use routeclouds_integration_tests::TestContext;

fn checkout() -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: Some("1 Harbour Road".to_string()),
        ..CheckoutRequest::default()
    }
}

fn money(s: &str) -> Money {
    Money::new(Decimal::from_str(s).unwrap()).unwrap()
}

// ============================================================================
// Placement
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_order_totals_and_stock() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;
    let product = ctx.product("Patch Cable", "9.99", 5).await;

    let carts = CartService::new(&ctx.pool);
    carts.add(user.id, product.id, 3).await.unwrap();

    let placed = OrderService::new(&ctx.pool)
        .place_order(user.id, checkout())
        .await
        .unwrap();

    assert_eq!(placed.total_amount, money("29.97"));
    assert_eq!(placed.status, OrderStatus::Confirmed);
    assert_eq!(placed.payment_status, PaymentStatus::Pending);
    assert_eq!(placed.item_count, 1);
    assert_eq!(ctx.stock_of(product.id).await, 2);
    assert!(carts.view(user.id).await.unwrap().items.is_empty());

    let detail = OrderService::new(&ctx.pool)
        .get(user.id, placed.id)
        .await
        .unwrap();
    assert_eq!(detail.billing_address, "1 Harbour Road");
    assert_eq!(detail.payment_method, "cash_on_delivery");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 3);
    assert_eq!(detail.items[0].unit_price, money("9.99"));
    assert_eq!(detail.items[0].total_price, money("29.97"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_out_of_stock_line_leaves_everything_unchanged() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;
    let a = ctx.product("Switch", "10.00", 5).await;
    let b = ctx.product("Transceiver", "4.50", 1).await;

    let carts = CartService::new(&ctx.pool);
    carts.add(user.id, a.id, 2).await.unwrap();
    carts.add(user.id, b.id, 1).await.unwrap();

    // Someone else buys the last unit of B between add-to-cart and checkout
    CatalogService::new(&ctx.pool)
        .update_product(b.id, ProductPatch { price: None, stock: Some(0) })
        .await
        .unwrap();

    let err = OrderService::new(&ctx.pool)
        .place_order(user.id, checkout())
        .await
        .unwrap_err();
    match err {
        OrderError::InsufficientStock(shortage) => {
            assert_eq!(shortage.product, b.name);
            assert_eq!(shortage.available, 0);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(ctx.stock_of(a.id).await, 5);
    assert_eq!(ctx.stock_of(b.id).await, 0);
    let cart = carts.view(user.id).await.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total_items, 3);
    assert!(OrderService::new(&ctx.pool).list(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_empty_cart_is_rejected() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;

    let err = OrderService::new(&ctx.pool)
        .place_order(user.id, checkout())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::EmptyCart));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_missing_shipping_address_touches_nothing() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;
    let product = ctx.product("Rack Shelf", "15.00", 3).await;
    CartService::new(&ctx.pool)
        .add(user.id, product.id, 1)
        .await
        .unwrap();

    let err = OrderService::new(&ctx.pool)
        .place_order(user.id, CheckoutRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));
    assert_eq!(ctx.stock_of(product.id).await, 3);
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_order_prices_are_frozen() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;
    let product = ctx.product("Load Balancer", "120.00", 4).await;

    CartService::new(&ctx.pool)
        .add(user.id, product.id, 2)
        .await
        .unwrap();
    let placed = OrderService::new(&ctx.pool)
        .place_order(user.id, checkout())
        .await
        .unwrap();

    CatalogService::new(&ctx.pool)
        .update_product(
            product.id,
            ProductPatch {
                price: Some(Decimal::from_str("150.00").unwrap()),
                stock: None,
            },
        )
        .await
        .unwrap();

    let detail = OrderService::new(&ctx.pool)
        .get(user.id, placed.id)
        .await
        .unwrap();
    assert_eq!(detail.total_amount, money("240.00"));
    assert_eq!(detail.items[0].unit_price, money("120.00"));
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_concurrent_orders_never_oversell() {
    const BUYERS: usize = 6;
    const STOCK: i32 = 4;

    let ctx = TestContext::new().await;
    let product = ctx.product("GPU Node", "999.00", STOCK).await;

    let mut buyers = Vec::with_capacity(BUYERS);
    for _ in 0..BUYERS {
        let user = ctx.user().await;
        CartService::new(&ctx.pool)
            .add(user.id, product.id, 1)
            .await
            .unwrap();
        buyers.push(user.id);
    }

    let handles: Vec<_> = buyers
        .into_iter()
        .map(|user_id| {
            let pool = ctx.pool.clone();
            tokio::spawn(async move {
                OrderService::new(&pool)
                    .place_order(user_id, checkout())
                    .await
            })
        })
        .collect();

    let mut placed = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(OrderError::InsufficientStock(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(placed, 4);
    assert_eq!(rejected, BUYERS - 4);
    assert_eq!(ctx.stock_of(product.id).await, 0);
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_orders_are_private() {
    let ctx = TestContext::new().await;
    let owner = ctx.user().await;
    let stranger = ctx.user().await;
    let product = ctx.product("Edge Router", "50.00", 2).await;

    CartService::new(&ctx.pool)
        .add(owner.id, product.id, 1)
        .await
        .unwrap();
    let placed = OrderService::new(&ctx.pool)
        .place_order(owner.id, checkout())
        .await
        .unwrap();

    let orders = OrderService::new(&ctx.pool);
    assert!(matches!(
        orders.get(stranger.id, placed.id).await,
        Err(OrderError::NotFound)
    ));
    assert!(orders.list(stranger.id).await.unwrap().is_empty());

    let history = orders.list(owner.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, placed.id);
    assert_eq!(history[0].item_count, 1);
}
