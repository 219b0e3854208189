//! Cart route handlers. Every handler acts on the caller's own cart.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use routeclouds_core::{CartItemId, ProductId};

use crate::error::{AppError, Result};
use crate::extract::{Json, Path};
use crate::middleware::CurrentUser;
use crate::models::{CartItem, CartSummary};
use crate::services::cart::CartService;
use crate::state::AppState;

/// Add-to-cart request body. Quantity defaults to 1.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: Option<i32>,
}

/// Response for mutations of a single line.
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<CartItem>,
}

/// Response for clearing the cart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCartResponse {
    pub message: &'static str,
    pub removed_items: u64,
}

/// `GET /api/cart`
pub async fn view(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<CartSummary>> {
    let summary = CartService::new(state.pool()).view(user.id).await?;
    Ok(Json(summary))
}

/// `POST /api/cart/add`
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartItemResponse>> {
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::BadRequest("productId is required".to_string()))?;

    let item = CartService::new(state.pool())
        .add(user.id, product_id, body.quantity.unwrap_or(1))
        .await?;

    Ok(Json(CartItemResponse {
        message: "Item added to cart",
        item: Some(item),
    }))
}

/// `PUT /api/cart/update/{id}`
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<CartItemId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartItemResponse>> {
    let quantity = body
        .quantity
        .ok_or_else(|| AppError::BadRequest("quantity is required".to_string()))?;

    let item = CartService::new(state.pool())
        .update_quantity(user.id, item_id, quantity)
        .await?;

    Ok(Json(CartItemResponse {
        message: "Cart item updated",
        item: Some(item),
    }))
}

/// `DELETE /api/cart/remove/{id}`
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<CartItemId>,
) -> Result<Json<CartItemResponse>> {
    CartService::new(state.pool())
        .remove(user.id, item_id)
        .await?;

    Ok(Json(CartItemResponse {
        message: "Item removed from cart",
        item: None,
    }))
}

/// `DELETE /api/cart/clear`
pub async fn clear(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ClearCartResponse>> {
    let removed_items = CartService::new(state.pool()).clear(user.id).await?;

    Ok(Json(ClearCartResponse {
        message: "Cart cleared",
        removed_items,
    }))
}
