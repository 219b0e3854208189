//! Catalog route handlers.
//!
//! Creating and updating require the admin role; product lookup is public.

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use routeclouds_core::ProductId;

use crate::error::Result;
use crate::extract::{Json, Path};
use crate::middleware::AdminUser;
use crate::models::{Category, Product};
use crate::services::catalog::{CatalogService, CategoryDraft, ProductDraft, ProductPatch};
use crate::state::AppState;

/// Single-category response.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub message: &'static str,
    pub category: Category,
}

/// Single-product response.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub product: Product,
}

/// `POST /api/categories`
#[tracing::instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<CategoryDraft>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    let category = CatalogService::new(state.pool())
        .create_category(draft)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            message: "Category created successfully",
            category,
        }),
    ))
}

/// `POST /api/products`
#[tracing::instrument(skip_all, fields(admin_id = %admin.id))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let product = CatalogService::new(state.pool())
        .create_product(draft)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: Some("Product created successfully"),
            product,
        }),
    ))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>> {
    let product = CatalogService::new(state.pool()).get_product(id).await?;
    Ok(Json(ProductResponse {
        message: None,
        product,
    }))
}

/// `PATCH /api/products/{id}`
#[tracing::instrument(skip_all, fields(admin_id = %admin.id, product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<ProductResponse>> {
    let product = CatalogService::new(state.pool())
        .update_product(id, patch)
        .await?;

    Ok(Json(ProductResponse {
        message: Some("Product updated successfully"),
        product,
    }))
}
