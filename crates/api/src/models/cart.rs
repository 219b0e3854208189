//! Cart models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use routeclouds_core::{CartItemId, Money, ProductId, UserId};

/// A stored cart row, as returned by add/update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields shown next to a cart line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub price: Money,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub stock: i32,
    pub category: Option<String>,
}

/// One line of the cart view, priced at the current catalog price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: CartItemId,
    pub quantity: i32,
    pub line_total: Money,
    pub added_at: DateTime<Utc>,
    pub product: CartProduct,
}

/// The whole cart with aggregate counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub items: Vec<CartLine>,
    /// Sum of quantities across lines.
    pub total_items: i64,
    pub total_amount: Money,
}

impl CartSummary {
    /// Aggregate a list of priced lines.
    #[must_use]
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let total_items = items.iter().map(|line| i64::from(line.quantity)).sum();
        let total_amount = items.iter().map(|line| line.line_total).sum();
        Self {
            items,
            total_items,
            total_amount,
        }
    }
}

/// A request for more units than a product has.
///
/// `available` is what the caller may still ask for: the product's stock, or
/// when adding to an existing line, the stock minus what is already in the
/// cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortage {
    pub product: String,
    pub available: i32,
}
