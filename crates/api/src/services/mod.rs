//! Business logic between routes and repositories.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;

pub use auth::{AuthError, AuthService, TokenService};
pub use cart::{CartError, CartService};
pub use catalog::{CatalogError, CatalogService};
pub use orders::{OrderError, OrderService};
