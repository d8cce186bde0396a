//! Product handlers.
//!
//! Product images are referenced by URL; uploads happen elsewhere.

use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};
use tracing::instrument;

use akwaba_core::ProductId;

use super::{CreatedResponse, MessageResponse};
use crate::db::{CatalogStore, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{Product, ProductInput};
use crate::state::AppState;

/// Unknown category on write is a client mistake, not a conflict.
fn category_error(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::Conflict(msg) if msg == "unknown category" => AppError::BadRequest(msg),
        other => AppError::Database(other),
    }
}

/// GET /products
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.store().list_products().await?))
}

/// GET /products/{id}
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<Product>> {
    let Path(id) = id?;
    state
        .store()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))
}

/// POST /products
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse<ProductId>>)> {
    let Json(input) = payload?;
    input
        .validate()
        .map_err(|m| AppError::BadRequest(m.to_owned()))?;

    let id = state
        .store()
        .create_product(&input)
        .await
        .map_err(category_error)?;
    tracing::info!(product_id = %id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "product created",
        }),
    ))
}

/// PUT /products/{id}
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
    payload: std::result::Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    input
        .validate()
        .map_err(|m| AppError::BadRequest(m.to_owned()))?;

    state
        .store()
        .update_product(id, &input)
        .await
        .map_err(category_error)?;
    Ok(Json(MessageResponse::new("product updated")))
}

/// DELETE /products/{id}
///
/// Refused with 409 once any order line references the product.
#[instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    id: std::result::Result<Path<ProductId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    state.store().delete_product(id).await?;
    Ok(Json(MessageResponse::new("product deleted")))
}
