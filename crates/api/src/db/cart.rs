//! Cart repository.
//!
//! Every query filters on the owning user's id. The functions taking a
//! `&mut PgConnection` run inside a transaction: the short ones opened by
//! cart writes, or the order-placement transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use routeclouds_core::{CartItemId, Money, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{CartItem, CartLine, CartProduct};
use crate::models::order::CheckoutLine;

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    quantity: i32,
    added_at: DateTime<Utc>,
    product_id: i32,
    name: String,
    brand: Option<String>,
    price: Money,
    description: Option<String>,
    images: Vec<String>,
    stock: i32,
    category: Option<String>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartItemId::new(row.id),
            quantity: row.quantity,
            line_total: row.price.times(row.quantity),
            added_at: row.added_at,
            product: CartProduct {
                id: ProductId::new(row.product_id),
                name: row.name,
                brand: row.brand,
                price: row.price,
                description: row.description,
                images: row.images,
                stock: row.stock,
                category: row.category,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct CheckoutLineRow {
    cart_item_id: i32,
    product_id: i32,
    product_name: String,
    quantity: i32,
    unit_price: Money,
    stock: i32,
}

impl From<CheckoutLineRow> for CheckoutLine {
    fn from(row: CheckoutLineRow) -> Self {
        Self {
            cart_item_id: CartItemId::new(row.cart_item_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            stock: row.stock,
        }
    }
}

/// A cart line together with its product's current stock.
#[derive(Debug, Clone)]
pub struct StockedCartItem {
    pub item: CartItem,
    pub product_name: String,
    pub stock: i32,
}

#[derive(sqlx::FromRow)]
struct StockedCartItemRow {
    #[sqlx(flatten)]
    item: CartItemRow,
    product_name: String,
    stock: i32,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lines in a user's cart with current product data, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT ci.id, ci.quantity, ci.created_at AS added_at,
                   p.id AS product_id, p.name, p.brand, p.price, p.description,
                   p.images, p.stock, c.name AS category
            FROM shop.cart_items ci
            JOIN shop.products p ON p.id = ci.product_id
            LEFT JOIN shop.categories c ON c.id = p.category_id
            WHERE ci.user_id = $1
            ORDER BY ci.created_at DESC, ci.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete one of the user's cart lines. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every line in the user's cart. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Quantity of a product already in the user's cart, if any.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn quantity_of(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
) -> Result<Option<i32>, RepositoryError> {
    let quantity = sqlx::query_scalar::<_, i32>(
        "SELECT quantity FROM shop.cart_items WHERE user_id = $1 AND product_id = $2",
    )
    .bind(user_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;

    Ok(quantity)
}

/// Add `quantity` units of a product, merging into an existing line.
///
/// The `(user_id, product_id)` unique constraint guarantees a single line
/// per product.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product or user vanished.
pub async fn add_quantity(
    conn: &mut PgConnection,
    user_id: UserId,
    product_id: ProductId,
    quantity: i32,
) -> Result<CartItem, RepositoryError> {
    let row = sqlx::query_as::<_, CartItemRow>(
        r"
        INSERT INTO shop.cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity,
                      updated_at = NOW()
        RETURNING id, user_id, product_id, quantity, created_at, updated_at
        ",
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(conn)
    .await
    .map_err(|e| RepositoryError::from_constraint(e, "cart line already exists"))?;

    Ok(row.into())
}

/// A user's cart line with its product's current stock, both rows locked
/// until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_line(
    conn: &mut PgConnection,
    user_id: UserId,
    item_id: CartItemId,
) -> Result<Option<StockedCartItem>, RepositoryError> {
    let row = sqlx::query_as::<_, StockedCartItemRow>(
        r"
        SELECT ci.id, ci.user_id, ci.product_id, ci.quantity, ci.created_at,
               ci.updated_at, p.name AS product_name, p.stock
        FROM shop.cart_items ci
        JOIN shop.products p ON p.id = ci.product_id
        WHERE ci.id = $1 AND ci.user_id = $2
        FOR UPDATE OF ci, p
        ",
    )
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|r| StockedCartItem {
        item: r.item.into(),
        product_name: r.product_name,
        stock: r.stock,
    }))
}

/// Overwrite the quantity of a user's cart line.
///
/// Returns `None` if the line does not exist or belongs to someone else.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn set_quantity(
    conn: &mut PgConnection,
    user_id: UserId,
    item_id: CartItemId,
    quantity: i32,
) -> Result<Option<CartItem>, RepositoryError> {
    let row = sqlx::query_as::<_, CartItemRow>(
        r"
        UPDATE shop.cart_items
        SET quantity = $3, updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, product_id, quantity, created_at, updated_at
        ",
    )
    .bind(item_id)
    .bind(user_id)
    .bind(quantity)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(Into::into))
}

/// Read the user's cart for checkout, locking every cart row and product row
/// involved until the transaction ends.
///
/// Rows are locked in product id order so two checkouts sharing products
/// always acquire locks in the same order. Quantities and stock are the
/// values current after any competing transaction commits.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_checkout_lines(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Vec<CheckoutLine>, RepositoryError> {
    let rows = sqlx::query_as::<_, CheckoutLineRow>(
        r"
        SELECT ci.id AS cart_item_id, ci.product_id, p.name AS product_name,
               ci.quantity, p.price AS unit_price, p.stock
        FROM shop.cart_items ci
        JOIN shop.products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.product_id
        FOR UPDATE OF ci, p
        ",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Delete the checked-out lines.
///
/// Only the locked lines are removed; a line added by a concurrent request
/// after the lock was taken stays in the cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete_checked_out(
    conn: &mut PgConnection,
    user_id: UserId,
    lines: &[CheckoutLine],
) -> Result<u64, RepositoryError> {
    let ids: Vec<i32> = lines.iter().map(|line| line.cart_item_id.as_i32()).collect();
    let result = sqlx::query("DELETE FROM shop.cart_items WHERE user_id = $1 AND id = ANY($2)")
        .bind(user_id)
        .bind(&ids)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}
