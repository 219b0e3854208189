//! Authentication service.
//!
//! Password accounts with Argon2id hashes, and HS256 bearer tokens that the
//! request extractors resolve back into an active [`User`].

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenService};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use routeclouds_core::{Email, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration input as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'r> {
    pub username: &'r str,
    pub email: &'r str,
    pub password: &'r str,
    pub first_name: Option<&'r str>,
    pub last_name: Option<&'r str>,
}

/// Authentication service.
///
/// Handles registration, password login and bearer token resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens,
        }
    }

    /// Register a new account and issue its first token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidField` if the username or email is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    pub async fn register(&self, registration: Registration<'_>) -> Result<(User, String), AuthError> {
        let username = Username::parse(registration.username)?;
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;

        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(&NewUser {
                username: &username,
                email: &email,
                password_hash: &password_hash,
                first_name: non_blank(registration.first_name),
                last_name: non_blank(registration.last_name),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok((user, token))
    }

    /// Login with a username or email and a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the login is unknown, the
    /// account is inactive, or the password is wrong.
    pub async fn login(&self, login: &str, password: &str) -> Result<(User, String), AuthError> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let (user, password_hash) = self
            .users
            .get_credentials(login)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }

    /// Resolve a bearer token to the active user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token does not verify.
    /// Returns `AuthError::InactiveUser` if the user is gone or deactivated.
    pub async fn resolve_bearer(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token)?;

        let user = self
            .users
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InactiveUser)?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }
        Ok(user)
    }
}

/// Treat empty optional text fields as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_minimum_length() {
        assert!(matches!(
            validate_password("12345"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Ada ")), Some("Ada"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
