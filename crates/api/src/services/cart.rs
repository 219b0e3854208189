//! Cart operations.
//!
//! Each mutation re-reads the product's current stock before writing; nothing
//! is cached between requests. Adds and quantity updates run in a short
//! transaction holding the product row lock, so the stock check and the write
//! cannot interleave with another cart write for the same product.

use sqlx::PgPool;
use thiserror::Error;

use routeclouds_core::{CartItemId, ProductId, UserId};

use crate::db::{CartRepository, RepositoryError, cart, catalog};
use crate::models::cart::{CartItem, CartSummary, StockShortage};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Bad input, such as a quantity below 1.
    #[error("{0}")]
    Validation(String),

    /// The product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The cart line does not exist or belongs to another user.
    #[error("cart item not found")]
    ItemNotFound,

    /// Not enough stock for the requested quantity.
    #[error("insufficient stock for {}: {} available", .0.product, .0.available)]
    InsufficientStock(StockShortage),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Cart service scoped to a connection pool.
pub struct CartService<'a> {
    pool: &'a PgPool,
    carts: CartRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            carts: CartRepository::new(pool),
        }
    }

    /// The user's cart priced at current catalog prices.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the query fails.
    pub async fn view(&self, user_id: UserId) -> Result<CartSummary, CartError> {
        let lines = self.carts.list_lines(user_id).await?;
        Ok(CartSummary::from_lines(lines))
    }

    /// Add units of a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a quantity below 1,
    /// `CartError::ProductNotFound` for an unknown product, and
    /// `CartError::InsufficientStock` with the remaining addable amount when
    /// the combined quantity would exceed stock.
    #[tracing::instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, CartError> {
        validate_quantity(quantity)?;

        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await?;

        let product = catalog::lock_stock(&mut *tx, product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;
        let existing = cart::quantity_of(&mut *tx, user_id, product_id).await?;

        check_addition(&product.name, product.stock, existing.unwrap_or(0), quantity)
            .map_err(CartError::InsufficientStock)?;

        let item = cart::add_quantity(&mut *tx, user_id, product_id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::ProductNotFound,
                other => CartError::Repository(other),
            })?;
        tx.commit().await?;

        tracing::debug!(cart_item_id = %item.id, quantity = item.quantity, "Cart line added");
        Ok(item)
    }

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a quantity below 1,
    /// `CartError::ItemNotFound` if the line is not the user's and
    /// `CartError::InsufficientStock` if the quantity exceeds current stock.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartItem, CartError> {
        validate_quantity(quantity)?;

        let mut tx = self.pool.begin().await?;

        let line = cart::lock_line(&mut *tx, user_id, item_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        if quantity > line.stock {
            return Err(CartError::InsufficientStock(StockShortage {
                product: line.product_name,
                available: line.stock,
            }));
        }

        let item = cart::set_quantity(&mut *tx, user_id, item_id, quantity)
            .await?
            .ok_or(CartError::ItemNotFound)?;
        tx.commit().await?;

        Ok(item)
    }

    /// Remove one line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the line is not the user's.
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<(), CartError> {
        if self.carts.remove(user_id, item_id).await? {
            Ok(())
        } else {
            Err(CartError::ItemNotFound)
        }
    }

    /// Empty the user's cart. Clearing an empty cart succeeds with 0.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, CartError> {
        Ok(self.carts.clear(user_id).await?)
    }
}

/// Reject quantities below 1.
fn validate_quantity(quantity: i32) -> Result<(), CartError> {
    if quantity < 1 {
        return Err(CartError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Check that `existing + requested` units fit in `stock`.
///
/// On failure the shortage reports how many more units may still be added.
fn check_addition(
    product: &str,
    stock: i32,
    existing: i32,
    requested: i32,
) -> Result<i32, StockShortage> {
    let combined = existing.saturating_add(requested);
    if combined > stock {
        return Err(StockShortage {
            product: product.to_string(),
            available: (stock - existing).max(0),
        });
    }
    Ok(combined)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_within_stock() {
        assert_eq!(check_addition("Cisco Router", 50, 0, 3), Ok(3));
        assert_eq!(check_addition("Cisco Router", 3, 0, 3), Ok(3));
    }

    #[test]
    fn test_new_line_over_stock() {
        let shortage = check_addition("Firewall Appliance", 2, 0, 3).unwrap_err();
        assert_eq!(shortage.product, "Firewall Appliance");
        assert_eq!(shortage.available, 2);
    }

    #[test]
    fn test_merge_reports_remaining_addable() {
        // 4 already in the cart, 6 in stock: only 2 more can be added
        let shortage = check_addition("AWS EC2 Instance", 6, 4, 3).unwrap_err();
        assert_eq!(shortage.available, 2);
        assert_eq!(check_addition("AWS EC2 Instance", 6, 4, 2), Ok(6));
    }

    #[test]
    fn test_merge_after_restock_down() {
        // Stock dropped below what is already in the cart
        let shortage = check_addition("AWS EC2 Instance", 1, 4, 1).unwrap_err();
        assert_eq!(shortage.available, 0);
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(matches!(validate_quantity(0), Err(CartError::Validation(_))));
        assert!(matches!(validate_quantity(-2), Err(CartError::Validation(_))));
        assert!(validate_quantity(1).is_ok());
    }
}
