//! Domain models returned by repositories and serialized by routes.
//!
//! JSON field names are `camelCase`; amounts are [`Money`](routeclouds_core::Money)
//! and serialize as decimal strings.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::{CartItem, CartLine, CartProduct, CartSummary, StockShortage};
pub use catalog::{Category, NewCategory, NewProduct, Product, ProductUpdate};
pub use order::{
    Checkout, CheckoutLine, OrderDetail, OrderLine, OrderSummary, OrderedProduct, PlacedOrder,
};
pub use user::{NewUser, User};
