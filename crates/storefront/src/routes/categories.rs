//! Category handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};
use tracing::instrument;

use akwaba_core::CategoryId;

use super::MessageResponse;
use crate::db::CatalogStore;
use crate::error::{AppError, Result};
use crate::models::{Category, NameInput};
use crate::state::AppState;

/// GET /categories
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.store().list_categories().await?))
}

/// POST /categories
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NameInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>)> {
    let Json(input) = payload?;
    let name = input.validated().map_err(|m| AppError::BadRequest(m.to_owned()))?;
    let category = state.store().create_category(name).await?;
    tracing::info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/{id}
#[instrument(skip_all)]
pub async fn rename(
    State(state): State<AppState>,
    id: std::result::Result<Path<CategoryId>, PathRejection>,
    payload: std::result::Result<Json<NameInput>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let name = input.validated().map_err(|m| AppError::BadRequest(m.to_owned()))?;
    state.store().rename_category(id, name).await?;
    Ok(Json(MessageResponse::new("category updated")))
}

/// DELETE /categories/{id}
///
/// Refused with 409 while subcategories or products still reference it.
#[instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    id: std::result::Result<Path<CategoryId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    state.store().delete_category(id).await?;
    Ok(Json(MessageResponse::new("category deleted")))
}
