//! RouteClouds shop API library.
//!
//! REST API for the shop: accounts, catalog administration, carts and the
//! order-placement transaction. The binary in `main.rs` wires this library to
//! a listener; tests drive [`routes::app`] directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
