//! RouteClouds Core - Shared domain types.
//!
//! This crate provides the types shared by the RouteClouds shop components:
//! - `api` - REST API for catalog, accounts, cart and orders
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! The optional `postgres` feature adds `sqlx` encode/decode support so the
//! same types can be bound and fetched directly.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, account fields and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
