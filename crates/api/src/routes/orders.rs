//! Order route handlers.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use routeclouds_core::OrderId;

use crate::error::Result;
use crate::extract::{Json, Path};
use crate::middleware::CurrentUser;
use crate::models::{OrderDetail, OrderSummary, PlacedOrder};
use crate::services::orders::{CheckoutRequest, OrderService};
use crate::state::AppState;

/// Order creation request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_address: Option<String>,
    pub billing_address: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl From<CreateOrderRequest> for CheckoutRequest {
    fn from(body: CreateOrderRequest) -> Self {
        Self {
            shipping_address: body.shipping_address,
            billing_address: body.billing_address,
            payment_method: body.payment_method,
            notes: body.notes,
        }
    }
}

/// Response for a placed order.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub message: &'static str,
    pub order: PlacedOrder,
}

/// Order history response.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderSummary>,
}

/// Order detail response.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: OrderDetail,
}

/// `POST /api/orders/create`
#[tracing::instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>)> {
    let order = OrderService::new(state.pool())
        .place_order(user.id, body.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            message: "Order created successfully",
            order,
        }),
    ))
}

/// `GET /api/orders`
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<OrderListResponse>> {
    let orders = OrderService::new(state.pool()).list(user.id).await?;
    Ok(Json(OrderListResponse { orders }))
}

/// `GET /api/orders/{id}`
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderDetailResponse>> {
    let order = OrderService::new(state.pool())
        .get(user.id, order_id)
        .await?;
    Ok(Json(OrderDetailResponse { order }))
}
