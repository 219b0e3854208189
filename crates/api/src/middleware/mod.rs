//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fill the span field, echo `x-request-id`)
//! 4. CORS
//!
//! Authentication is not a layer: handlers opt in with the [`CurrentUser`]
//! or [`AdminUser`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{AdminUser, CurrentUser, bearer_token};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
