//! Core types for the RouteClouds shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod account;
pub mod id;
pub mod money;
pub mod status;

pub use account::{AccountFieldError, Email, Username};
pub use id::*;
pub use money::{Money, MoneyError};
pub use status::*;
