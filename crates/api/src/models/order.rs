//! Order models.
//!
//! Order rows and their items are written once, by order placement. Unit
//! prices and line totals are copied from the catalog at that moment and are
//! never re-read from `products` afterwards.

use chrono::{DateTime, Utc};
use serde::Serialize;

use routeclouds_core::{
    CartItemId, Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId,
};

/// Validated checkout input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub shipping_address: String,
    pub billing_address: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

/// A cart line joined with its product, read under row locks during
/// placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub stock: i32,
}

/// What order placement returns once committed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub id: OrderId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub item_count: usize,
}

/// One row of the order history list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields shown next to an order line.
///
/// Descriptive only; price comes from the frozen order line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedProduct {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub category: Option<String>,
}

/// A frozen order line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderItemId,
    pub quantity: i32,
    pub unit_price: Money,
    pub total_price: Money,
    pub product: OrderedProduct,
}

/// A full order with its lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: OrderId,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: String,
    pub billing_address: String,
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderLine>,
}
