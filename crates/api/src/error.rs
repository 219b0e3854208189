//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Responses carry a JSON body:
//!
//! ```json
//! { "error": "insufficient_stock", "message": "...", "product": "B", "available": 0 }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::cart::StockShortage;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::orders::OrderError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Catalog operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status, machine-readable kind, client message and extra body fields.
struct ErrorParts {
    status: StatusCode,
    kind: &'static str,
    message: String,
    shortage: Option<StockShortage>,
}

impl ErrorParts {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            shortage: None,
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
        )
    }

    fn insufficient_stock(shortage: &StockShortage) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            kind: "insufficient_stock",
            message: format!(
                "Insufficient stock for {}. Available: {}",
                shortage.product, shortage.available
            ),
            shortage: Some(shortage.clone()),
        }
    }
}

impl AppError {
    fn parts(&self) -> ErrorParts {
        match self {
            Self::Database(_) | Self::Internal(_) => ErrorParts::internal(),
            Self::NotFound(what) => ErrorParts::not_found(what.clone()),
            Self::BadRequest(msg) => ErrorParts::validation(msg.clone()),
            Self::Auth(err) => auth_parts(err),
            Self::Cart(err) => match err {
                CartError::Validation(msg) => ErrorParts::validation(msg.clone()),
                CartError::ProductNotFound => ErrorParts::not_found("Product not found"),
                CartError::ItemNotFound => ErrorParts::not_found("Cart item not found"),
                CartError::InsufficientStock(shortage) => {
                    ErrorParts::insufficient_stock(shortage)
                }
                CartError::Repository(_) => ErrorParts::internal(),
            },
            Self::Order(err) => match err {
                OrderError::Validation(msg) => ErrorParts::validation(msg.clone()),
                OrderError::EmptyCart => {
                    ErrorParts::new(StatusCode::BAD_REQUEST, "empty_cart", "Cart is empty")
                }
                OrderError::InsufficientStock(shortage) => {
                    ErrorParts::insufficient_stock(shortage)
                }
                OrderError::NotFound => ErrorParts::not_found("Order not found"),
                OrderError::TransactionFailure(_) => ErrorParts::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "transaction_failure",
                    "Order could not be placed, no changes were made",
                ),
                OrderError::Repository(_) => ErrorParts::internal(),
            },
            Self::Catalog(err) => match err {
                CatalogError::Validation(msg) => ErrorParts::validation(msg.clone()),
                CatalogError::InvalidPrice(e) => ErrorParts::validation(format!("price: {e}")),
                CatalogError::DuplicateSlug => ErrorParts::new(
                    StatusCode::CONFLICT,
                    "conflict",
                    "Category slug already exists",
                ),
                CatalogError::CategoryNotFound => ErrorParts::not_found("Category not found"),
                CatalogError::ProductNotFound => ErrorParts::not_found("Product not found"),
                CatalogError::Repository(_) => ErrorParts::internal(),
            },
        }
    }
}

fn auth_parts(err: &AuthError) -> ErrorParts {
    match err {
        AuthError::InvalidField(e) => ErrorParts::validation(e.to_string()),
        AuthError::WeakPassword(msg) => ErrorParts::validation(msg.clone()),
        AuthError::InvalidCredentials => {
            ErrorParts::new(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid credentials")
        }
        AuthError::MissingToken => {
            ErrorParts::new(StatusCode::UNAUTHORIZED, "unauthorized", "Access token required")
        }
        AuthError::InactiveUser => ErrorParts::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "User not found or inactive",
        ),
        AuthError::InvalidToken => {
            ErrorParts::new(StatusCode::FORBIDDEN, "forbidden", "Invalid or expired token")
        }
        AuthError::NotAdmin => {
            ErrorParts::new(StatusCode::FORBIDDEN, "forbidden", "Admin access required")
        }
        AuthError::UserAlreadyExists => ErrorParts::new(
            StatusCode::CONFLICT,
            "conflict",
            "User with this username or email already exists",
        ),
        AuthError::Repository(_) | AuthError::PasswordHash | AuthError::TokenIssue(_) => {
            ErrorParts::internal()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let parts = self.parts();

        // Capture server errors to Sentry
        if parts.status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %parts.status, "Request rejected");
        }

        let mut body = json!({
            "error": parts.kind,
            "message": parts.message,
        });
        if let (Some(shortage), Value::Object(map)) = (parts.shortage, &mut body) {
            map.insert("product".to_string(), Value::String(shortage.product));
            map.insert("available".to_string(), Value::from(shortage.available));
        }

        (parts.status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use routeclouds_core::MoneyError;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status(OrderError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(OrderError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(status(OrderError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(CartError::ItemNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status(AuthError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::InactiveUser), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AuthError::InvalidToken), StatusCode::FORBIDDEN);
        assert_eq!(status(AuthError::NotAdmin), StatusCode::FORBIDDEN);
        assert_eq!(status(AuthError::UserAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(status(CatalogError::DuplicateSlug), StatusCode::CONFLICT);
        assert_eq!(
            status(CatalogError::InvalidPrice(MoneyError::TooLarge)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(OrderError::TransactionFailure(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_body() {
        let err = AppError::from(OrderError::InsufficientStock(StockShortage {
            product: "Firewall Appliance".to_string(),
            available: 0,
        }));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["error"], "insufficient_stock");
        assert_eq!(body["product"], "Firewall Appliance");
        assert_eq!(body["available"], 0);
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "password column mangled".to_string(),
        ));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "internal_error");
        assert!(!body.to_string().contains("password column"));
    }
}
