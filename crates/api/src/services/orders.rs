//! Order placement and order history.
//!
//! Placing an order turns the user's cart into an order in one database
//! transaction:
//!
//! 1. lock the user's cart rows and their product rows (product id order)
//! 2. fail with `EmptyCart` or the first `InsufficientStock`
//! 3. insert the order with the exact decimal total
//! 4. insert each frozen line and decrement its product's stock
//! 5. delete the checked-out cart rows
//! 6. commit
//!
//! Any error rolls the transaction back before it is returned, so either all
//! of these effects are visible or none are.

use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use routeclouds_core::{Money, OrderId, OrderStatus, PaymentStatus, UserId};

use crate::db::orders::{self, NewOrderItem};
use crate::db::{OrderRepository, RepositoryError, cart};
use crate::models::cart::StockShortage;
use crate::models::order::{Checkout, CheckoutLine, OrderDetail, OrderSummary, PlacedOrder};

/// Payment method used when the client does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "cash_on_delivery";

/// Column width of `orders.payment_method`.
const MAX_PAYMENT_METHOD_LENGTH: usize = 50;

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Missing or invalid checkout input.
    #[error("{0}")]
    Validation(String),

    /// The user's cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A line asks for more than its product's stock.
    #[error("insufficient stock for {}: {} available", .0.product, .0.available)]
    InsufficientStock(StockShortage),

    /// The order does not exist or belongs to another user.
    #[error("order not found")]
    NotFound,

    /// The placement transaction failed and was rolled back.
    #[error("order transaction failed: {0}")]
    TransactionFailure(#[source] RepositoryError),

    /// Repository error outside the placement transaction.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::TransactionFailure(RepositoryError::Database(err))
    }
}

/// Checkout input as received from the client.
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// Validate and apply defaults.
    ///
    /// The billing address defaults to the shipping address and the payment
    /// method to [`DEFAULT_PAYMENT_METHOD`]. Blank optional fields count as
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` if the shipping address is missing or
    /// blank, or the payment method is too long.
    pub fn into_checkout(self) -> Result<Checkout, OrderError> {
        let shipping_address = present(self.shipping_address)
            .ok_or_else(|| OrderError::Validation("shipping address is required".to_string()))?;
        let billing_address =
            present(self.billing_address).unwrap_or_else(|| shipping_address.clone());
        let payment_method =
            present(self.payment_method).unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        if payment_method.chars().count() > MAX_PAYMENT_METHOD_LENGTH {
            return Err(OrderError::Validation(format!(
                "payment method must be at most {MAX_PAYMENT_METHOD_LENGTH} characters"
            )));
        }

        Ok(Checkout {
            shipping_address,
            billing_address,
            payment_method,
            notes: present(self.notes),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The priced, stock-checked content of an order about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    pub items: Vec<NewOrderItem>,
    pub total: Money,
}

impl OrderPlan {
    /// Price the locked cart lines and check every quantity against stock.
    ///
    /// Stops at the first line, in the given order, whose quantity exceeds
    /// its product's stock.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyCart` for no lines,
    /// `OrderError::InsufficientStock` naming the first short product, and
    /// `OrderError::Validation` when a line or the order total would not fit
    /// the amount columns.
    pub fn from_lines(lines: &[CheckoutLine]) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity > line.stock {
                return Err(OrderError::InsufficientStock(StockShortage {
                    product: line.product_name.clone(),
                    available: line.stock,
                }));
            }
            let total_price = line
                .unit_price
                .checked_times(line.quantity)
                .ok_or_else(|| too_large(&line.product_name))?;
            items.push(NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price,
            });
        }

        let total = items
            .iter()
            .try_fold(Money::ZERO, |total, item| total.checked_add(item.total_price))
            .ok_or_else(|| {
                OrderError::Validation(format!("order total cannot exceed {}", Money::MAX))
            })?;
        Ok(Self { items, total })
    }
}

fn too_large(product: &str) -> OrderError {
    OrderError::Validation(format!(
        "line total for {product} cannot exceed {}",
        Money::MAX
    ))
}

/// Order service scoped to a connection pool.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Convert the user's cart into a confirmed order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` for bad checkout input,
    /// `OrderError::EmptyCart`, `OrderError::InsufficientStock`, or
    /// `OrderError::TransactionFailure` for storage errors. In every error
    /// case nothing has been written.
    #[tracing::instrument(skip(self, request))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> Result<PlacedOrder, OrderError> {
        let checkout = request.into_checkout()?;

        let mut tx = self.pool.begin().await?;
        match place_in_transaction(&mut *tx, user_id, &checkout).await {
            Ok(placed) => {
                tx.commit().await?;
                tracing::info!(
                    order_id = %placed.id,
                    total = %placed.total_amount,
                    items = placed.item_count,
                    "Order placed"
                );
                Ok(placed)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Order rollback failed");
                }
                tracing::info!(error = %err, "Order placement aborted");
                Err(err)
            }
        }
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<OrderSummary>, OrderError> {
        Ok(self.orders.list_for_user(user_id).await?)
    }

    /// One of the user's orders with its frozen lines.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is missing or not the
    /// user's.
    pub async fn get(&self, user_id: UserId, order_id: OrderId) -> Result<OrderDetail, OrderError> {
        self.orders
            .get_for_user(user_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }
}

/// Body of the placement transaction. The caller commits or rolls back.
async fn place_in_transaction(
    conn: &mut PgConnection,
    user_id: UserId,
    checkout: &Checkout,
) -> Result<PlacedOrder, OrderError> {
    let lines = cart::lock_checkout_lines(conn, user_id)
        .await
        .map_err(OrderError::TransactionFailure)?;
    let plan = OrderPlan::from_lines(&lines)?;

    let inserted = orders::insert_order(conn, user_id, checkout, plan.total)
        .await
        .map_err(OrderError::TransactionFailure)?;

    for (item, line) in plan.items.iter().zip(&lines) {
        orders::insert_item(conn, inserted.id, item)
            .await
            .map_err(OrderError::TransactionFailure)?;

        let decremented = orders::decrement_stock(conn, item.product_id, item.quantity)
            .await
            .map_err(OrderError::TransactionFailure)?;
        if !decremented {
            // Unreachable while the product row is locked
            return Err(OrderError::InsufficientStock(StockShortage {
                product: line.product_name.clone(),
                available: line.stock,
            }));
        }
    }

    cart::delete_checked_out(conn, user_id, &lines)
        .await
        .map_err(OrderError::TransactionFailure)?;

    Ok(PlacedOrder {
        id: inserted.id,
        total_amount: plan.total,
        status: OrderStatus::Confirmed,
        payment_status: PaymentStatus::Pending,
        created_at: inserted.created_at,
        item_count: plan.items.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::str::FromStr;

    use rust_decimal::Decimal;
    use routeclouds_core::{CartItemId, ProductId};

    use super::*;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap()).unwrap()
    }

    fn line(id: i32, name: &str, price: &str, quantity: i32, stock: i32) -> CheckoutLine {
        CheckoutLine {
            cart_item_id: CartItemId::new(id * 10),
            product_id: ProductId::new(id),
            product_name: name.to_string(),
            quantity,
            unit_price: money(price),
            stock,
        }
    }

    #[test]
    fn test_empty_cart() {
        assert!(matches!(
            OrderPlan::from_lines(&[]),
            Err(OrderError::EmptyCart)
        ));
    }

    #[test]
    fn test_out_of_stock_line_names_product() {
        let lines = [line(1, "A", "25.00", 2, 10), line(2, "B", "10.00", 1, 0)];
        let err = OrderPlan::from_lines(&lines).unwrap_err();
        let OrderError::InsufficientStock(shortage) = err else {
            panic!("expected InsufficientStock, got {err:?}");
        };
        assert_eq!(shortage.product, "B");
        assert_eq!(shortage.available, 0);
    }

    #[test]
    fn test_first_short_line_wins() {
        let lines = [
            line(1, "A", "1.00", 5, 4),
            line(2, "B", "1.00", 5, 1),
        ];
        let OrderError::InsufficientStock(shortage) = OrderPlan::from_lines(&lines).unwrap_err()
        else {
            panic!("expected InsufficientStock");
        };
        assert_eq!(shortage.product, "A");
        assert_eq!(shortage.available, 4);
    }

    #[test]
    fn test_total_is_exact() {
        let plan = OrderPlan::from_lines(&[line(1, "A", "9.99", 3, 5)]).unwrap();
        assert_eq!(plan.total, money("29.97"));
        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].unit_price, money("9.99"));
        assert_eq!(plan.items[0].total_price, money("29.97"));
    }

    #[test]
    fn test_total_sums_lines() {
        let plan = OrderPlan::from_lines(&[
            line(1, "AWS EC2 Instance", "99.99", 2, 100),
            line(2, "Cisco Router", "299.99", 1, 50),
            line(4, "Jenkins CI/CD Platform", "0.00", 7, 999),
        ])
        .unwrap();
        assert_eq!(plan.total, money("499.97"));
    }

    #[test]
    fn test_oversized_line_is_a_validation_error() {
        let lines = [line(1, "Mainframe", "9999999999.99", 2, 5)];
        let err = OrderPlan::from_lines(&lines).unwrap_err();
        assert!(matches!(err, OrderError::Validation(msg) if msg.contains("Mainframe")));
    }

    #[test]
    fn test_oversized_total_is_a_validation_error() {
        let lines = [
            line(1, "A", "6000000000.00", 1, 5),
            line(2, "B", "6000000000.00", 1, 5),
        ];
        let err = OrderPlan::from_lines(&lines).unwrap_err();
        assert!(matches!(err, OrderError::Validation(msg) if msg.contains("order total")));
    }

    #[test]
    fn test_quantity_equal_to_stock_is_allowed() {
        assert!(OrderPlan::from_lines(&[line(1, "A", "5.00", 3, 3)]).is_ok());
    }

    #[test]
    fn test_checkout_defaults() {
        let checkout = CheckoutRequest {
            shipping_address: Some("  1 Main St ".to_string()),
            billing_address: Some("   ".to_string()),
            payment_method: None,
            notes: Some(String::new()),
        }
        .into_checkout()
        .unwrap();

        assert_eq!(checkout.shipping_address, "1 Main St");
        assert_eq!(checkout.billing_address, "1 Main St");
        assert_eq!(checkout.payment_method, DEFAULT_PAYMENT_METHOD);
        assert_eq!(checkout.notes, None);
    }

    #[test]
    fn test_checkout_requires_shipping_address() {
        let err = CheckoutRequest {
            shipping_address: Some("  ".to_string()),
            ..CheckoutRequest::default()
        }
        .into_checkout()
        .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert!(matches!(
            CheckoutRequest::default().into_checkout(),
            Err(OrderError::Validation(_))
        ));
    }

    #[test]
    fn test_checkout_payment_method_length() {
        let err = CheckoutRequest {
            shipping_address: Some("1 Main St".to_string()),
            payment_method: Some("x".repeat(51)),
            ..CheckoutRequest::default()
        }
        .into_checkout()
        .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }
}
