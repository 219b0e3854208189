//! Validated account fields: usernames and email addresses.
//!
//! Both are unique in the `shop.users` table and both are accepted as the
//! login identifier, so they are normalized the same way on every path:
//! surrounding whitespace is trimmed and emails are lowercased.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced when parsing a [`Username`] or an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountFieldError {
    /// The input is empty after trimming.
    #[error("{field} is required")]
    Empty {
        /// Which field was empty.
        field: &'static str,
    },
    /// The input is too long for its column.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Which field was too long.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// Username contains a character outside `[A-Za-z0-9_.-]`.
    #[error("username may only contain letters, digits, '_', '.' and '-'")]
    InvalidUsernameChar,
    /// Email is not of the form `local@domain`.
    #[error("email must look like name@domain")]
    MalformedEmail,
}

/// A shop username.
///
/// 1-50 characters from `[A-Za-z0-9_.-]`. Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct Username(String);

impl Username {
    /// Column width of `users.username`.
    pub const MAX_LENGTH: usize = 50;

    /// Parse and validate a username.
    ///
    /// # Errors
    ///
    /// Returns `AccountFieldError` if the input is empty, too long or contains
    /// characters outside the allowed set.
    pub fn parse(input: &str) -> Result<Self, AccountFieldError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AccountFieldError::Empty { field: "username" });
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(AccountFieldError::TooLong {
                field: "username",
                max: Self::MAX_LENGTH,
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(AccountFieldError::InvalidUsernameChar);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An email address, stored lowercased.
///
/// Only the shape `local@domain` is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct Email(String);

impl Email {
    /// Column width of `users.email`.
    pub const MAX_LENGTH: usize = 100;

    /// Parse, validate and lowercase an email address.
    ///
    /// # Errors
    ///
    /// Returns `AccountFieldError` if the input is empty, too long, or does
    /// not have exactly one `@` with text on both sides.
    pub fn parse(input: &str) -> Result<Self, AccountFieldError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AccountFieldError::Empty { field: "email" });
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(AccountFieldError::TooLong {
                field: "email",
                max: Self::MAX_LENGTH,
            });
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AccountFieldError::MalformedEmail);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(AccountFieldError::MalformedEmail);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(AccountFieldError::MalformedEmail);
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// The address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_username_trims_and_keeps_case() {
        let name = Username::parse("  Alice_01 ").unwrap();
        assert_eq!(name.as_str(), "Alice_01");
    }

    #[test]
    fn test_username_rejects_empty_and_spaces() {
        assert_eq!(
            Username::parse("   "),
            Err(AccountFieldError::Empty { field: "username" })
        );
        assert_eq!(
            Username::parse("alice smith"),
            Err(AccountFieldError::InvalidUsernameChar)
        );
    }

    #[test]
    fn test_username_too_long() {
        let long = "a".repeat(Username::MAX_LENGTH + 1);
        assert!(matches!(
            Username::parse(&long),
            Err(AccountFieldError::TooLong { .. })
        ));
    }

    #[test]
    fn test_email_lowercased() {
        let email = Email::parse("Alice@Example.COM").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_email_shape() {
        assert!(Email::parse("a@b").is_ok());
        assert_eq!(Email::parse("no-at"), Err(AccountFieldError::MalformedEmail));
        assert_eq!(Email::parse("@domain"), Err(AccountFieldError::MalformedEmail));
        assert_eq!(Email::parse("user@"), Err(AccountFieldError::MalformedEmail));
        assert_eq!(Email::parse("a@b@c"), Err(AccountFieldError::MalformedEmail));
        assert_eq!(Email::parse("a b@c"), Err(AccountFieldError::MalformedEmail));
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = Email::parse("").unwrap_err();
        assert_eq!(err.to_string(), "email is required");
    }
}
