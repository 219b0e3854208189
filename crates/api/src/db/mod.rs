//! Database access for the shop `PostgreSQL` schema.
//!
//! # Schema: `shop`
//!
//! - `users` - Accounts with Argon2id password hashes and a role
//! - `categories` - Catalog categories (optionally nested)
//! - `products` - Catalog products with price and stock
//! - `cart_items` - One row per (user, product) in a user's cart
//! - `orders` / `order_items` - Placed orders with frozen prices
//!
//! # Migrations
//!
//! Migrations live in `crates/api/migrations/`, are embedded in [`MIGRATOR`],
//! and are run explicitly:
//! ```bash
//! cargo run -p routeclouds-cli -- migrate
//! ```
//!
//! Queries use the runtime `sqlx::query_as` API with `FromRow` row types so
//! the crate builds without a live database.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use catalog::CatalogRepository;
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique and foreign-key violations to `Conflict` / `NotFound`.
    ///
    /// `conflict` describes the unique value that already exists.
    fn from_constraint(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(conflict.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::NotFound;
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
/// * `acquire_timeout` - How long a request waits for a free connection
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(acquire_timeout)
        .connect(database_url.expose_secret())
        .await
}
