//! Order repository.
//!
//! Writes happen only inside the order-placement transaction and take a
//! `&mut PgConnection`; reads go through [`OrderRepository`] and are always
//! scoped to the owning user.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use routeclouds_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Checkout, OrderDetail, OrderLine, OrderSummary, OrderedProduct};

/// A line to be written into `order_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Money,
    pub total_price: Money,
}

/// Columns generated by the database when an order row is inserted.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct InsertedOrder {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderSummaryRow {
    id: i32,
    total_amount: Money,
    status: OrderStatus,
    payment_status: PaymentStatus,
    shipping_address: String,
    payment_method: String,
    notes: Option<String>,
    item_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            total_amount: row.total_amount,
            status: row.status,
            payment_status: row.payment_status,
            shipping_address: row.shipping_address,
            payment_method: row.payment_method,
            notes: row.notes,
            item_count: row.item_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    total_amount: Money,
    status: OrderStatus,
    payment_status: PaymentStatus,
    shipping_address: String,
    billing_address: String,
    payment_method: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    quantity: i32,
    unit_price: Money,
    total_price: Money,
    product_id: i32,
    name: String,
    brand: Option<String>,
    description: Option<String>,
    images: Vec<String>,
    category: Option<String>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
            product: OrderedProduct {
                id: ProductId::new(row.product_id),
                name: row.name,
                brand: row.brand,
                description: row.description,
                images: row.images,
                category: row.category,
            },
        }
    }
}

/// Insert the order header row.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    user_id: UserId,
    checkout: &Checkout,
    total_amount: Money,
) -> Result<InsertedOrder, RepositoryError> {
    let inserted = sqlx::query_as::<_, InsertedOrder>(
        r"
        INSERT INTO shop.orders
            (user_id, total_amount, status, shipping_address, billing_address,
             payment_method, payment_status, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, created_at
        ",
    )
    .bind(user_id)
    .bind(total_amount)
    .bind(OrderStatus::Confirmed)
    .bind(&checkout.shipping_address)
    .bind(&checkout.billing_address)
    .bind(&checkout.payment_method)
    .bind(PaymentStatus::Pending)
    .bind(checkout.notes.as_deref())
    .fetch_one(conn)
    .await?;

    Ok(inserted)
}

/// Insert one frozen order line.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert_item(
    conn: &mut PgConnection,
    order_id: OrderId,
    item: &NewOrderItem,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO shop.order_items (order_id, product_id, quantity, unit_price, total_price)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(item.total_price)
    .execute(conn)
    .await?;

    Ok(())
}

/// Take `quantity` units out of a product's stock.
///
/// The update only applies while enough stock remains, so it returns
/// `false` instead of driving stock negative.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub async fn decrement_stock(
    conn: &mut PgConnection,
    product_id: ProductId,
    quantity: i32,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE shop.products
        SET stock = stock - $2, updated_at = NOW()
        WHERE id = $1 AND stock >= $2
        ",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Repository for reading placed orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's orders, newest first, with line counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            r"
            SELECT o.id, o.total_amount, o.status, o.payment_status, o.shipping_address,
                   o.payment_method, o.notes, COUNT(oi.id) AS item_count,
                   o.created_at, o.updated_at
            FROM shop.orders o
            LEFT JOIN shop.order_items oi ON oi.order_id = o.id
            WHERE o.user_id = $1
            GROUP BY o.id
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One of the user's orders with its frozen lines.
    ///
    /// Returns `None` when the order does not exist or belongs to another
    /// user; callers cannot tell the two apart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, total_amount, status, payment_status, shipping_address,
                   billing_address, payment_method, notes, created_at, updated_at
            FROM shop.orders
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT oi.id, oi.quantity, oi.unit_price, oi.total_price,
                   p.id AS product_id, p.name, p.brand, p.description, p.images,
                   c.name AS category
            FROM shop.order_items oi
            JOIN shop.products p ON p.id = oi.product_id
            LEFT JOIN shop.categories c ON c.id = p.category_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(OrderDetail {
            id: OrderId::new(order.id),
            total_amount: order.total_amount,
            status: order.status,
            payment_status: order.payment_status,
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            payment_method: order.payment_method,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: items.into_iter().map(Into::into).collect(),
        }))
    }
}
