//! Request extractors whose rejections use the JSON error body.
//!
//! Axum's own `Json` and `Path` reject with plain-text 400/415/422
//! responses. These wrappers turn every rejection into
//! [`AppError::BadRequest`], so malformed bodies and ids get the same
//! `{error, message}` shape as every other failure.

use axum::{
    extract::{FromRequest, FromRequestParts, rejection::JsonRejection, rejection::PathRejection},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::AppError;

/// JSON request body, and JSON response body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
