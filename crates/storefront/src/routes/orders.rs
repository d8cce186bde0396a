//! Checkout and order administration handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use akwaba_core::OrderId;

use super::MessageResponse;
use crate::db::OrderStore;
use crate::error::{AppError, Result};
use crate::models::{CheckoutRequest, OrderDetail, OrderSummary, UpdateStatusRequest};
use crate::services::CheckoutService;
use crate::state::AppState;

/// Response for a committed checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: OrderId,
    pub message: &'static str,
}

/// Place an order.
///
/// POST /orders
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let Json(request) = payload?;
    let order_id = CheckoutService::new(state.store())
        .place_order(&request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id,
            message: "order created",
        }),
    ))
}

/// All orders, newest first.
///
/// GET /orders
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<OrderSummary>>> {
    let orders = state.store().list_orders().await?;
    Ok(Json(orders))
}

/// One order with its lines.
///
/// GET /orders/{id}
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<OrderDetail>> {
    let Path(id) = id?;
    let order = state
        .store()
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))?;
    Ok(Json(order))
}

/// Change an order's status.
///
/// PUT /orders/{id}/status
#[instrument(skip_all)]
pub async fn update_status(
    State(state): State<AppState>,
    id: std::result::Result<Path<OrderId>, PathRejection>,
    payload: std::result::Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let status = request.status.trim();
    if status.is_empty() {
        return Err(AppError::BadRequest("status is required".to_owned()));
    }

    state.store().update_order_status(id, status).await?;
    tracing::info!(order_id = %id, status, "order status updated");
    Ok(Json(MessageResponse::new("order status updated")))
}
