//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use routeclouds_core::{Email, UserId, UserRole, Username};

/// A registered account.
///
/// The password hash is never part of this type; it is loaded separately
/// during login only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
    #[serde(skip)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account may manage the catalog.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Fields for inserting a new account.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a Username,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}
