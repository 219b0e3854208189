//! Authentication error types.

use thiserror::Error;

use routeclouds_core::AccountFieldError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username or email.
    #[error("{0}")]
    InvalidField(#[from] AccountFieldError),

    /// Password too weak or missing.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Wrong password, unknown login, or inactive account at login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// No bearer token on a protected request.
    #[error("access token required")]
    MissingToken,

    /// Bearer token is malformed, expired, or signed with another key.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Token is valid but its user no longer exists or was deactivated.
    #[error("user not found or inactive")]
    InactiveUser,

    /// Authenticated user lacks the admin role.
    #[error("admin access required")]
    NotAdmin,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error("token signing error: {0}")]
    TokenIssue(String),
}
