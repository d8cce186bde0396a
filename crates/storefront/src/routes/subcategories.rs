//! Subcategory handlers.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use tracing::instrument;

use akwaba_core::SubcategoryId;

use super::MessageResponse;
use crate::db::{CatalogStore, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{NameInput, Subcategory, SubcategoryInput, SubcategoryQuery};
use crate::state::AppState;

/// GET /subcategories?category_id=
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<SubcategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<Subcategory>>> {
    let Query(query) = query?;
    let category_id = query
        .category_id
        .ok_or_else(|| AppError::BadRequest("category_id is required".to_owned()))?;
    Ok(Json(state.store().list_subcategories(category_id).await?))
}

/// POST /subcategories
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubcategoryInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Subcategory>)> {
    let Json(input) = payload?;
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    let category_id = input
        .category_id
        .ok_or_else(|| AppError::BadRequest("category_id is required".to_owned()))?;

    let subcategory = state
        .store()
        .create_subcategory(name, category_id)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other),
        })?;
    Ok((StatusCode::CREATED, Json(subcategory)))
}

/// PUT /subcategories/{id}
#[instrument(skip_all)]
pub async fn rename(
    State(state): State<AppState>,
    id: std::result::Result<Path<SubcategoryId>, PathRejection>,
    payload: std::result::Result<Json<NameInput>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let name = input.validated().map_err(|m| AppError::BadRequest(m.to_owned()))?;
    state.store().rename_subcategory(id, name).await?;
    Ok(Json(MessageResponse::new("subcategory updated")))
}

/// DELETE /subcategories/{id}
#[instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    id: std::result::Result<Path<SubcategoryId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    state.store().delete_subcategory(id).await?;
    Ok(Json(MessageResponse::new("subcategory deleted")))
}
