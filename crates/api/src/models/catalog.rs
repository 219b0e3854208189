//! Catalog models: categories and products.

use chrono::{DateTime, Utc};
use serde::Serialize;

use routeclouds_core::{CategoryId, Money, ProductId};

/// A catalog category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

/// A catalog product with its current price and stock.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Name of `category_id`, joined in for display.
    pub category_name: Option<String>,
    pub price: Money,
    pub description: Option<String>,
    pub specifications: serde_json::Value,
    pub images: Vec<String>,
    pub stock: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting a category.
#[derive(Debug)]
pub struct NewCategory<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub parent_id: Option<CategoryId>,
}

/// Fields for inserting a product.
#[derive(Debug)]
pub struct NewProduct<'a> {
    pub name: &'a str,
    pub brand: Option<&'a str>,
    pub category_id: Option<CategoryId>,
    pub price: Money,
    pub description: Option<&'a str>,
    pub specifications: &'a serde_json::Value,
    pub images: &'a [String],
    pub stock: i32,
    pub featured: bool,
}

/// Partial product update. `None` leaves the column unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductUpdate {
    pub price: Option<Money>,
    pub stock: Option<i32>,
}

impl ProductUpdate {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.price.is_none() && self.stock.is_none()
    }
}
