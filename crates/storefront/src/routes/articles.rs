//! Blog article handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::instrument;

use akwaba_core::ArticleId;

use super::CreatedResponse;
use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{Article, ArticleInput};
use crate::state::AppState;

/// GET /articles
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Article>>> {
    Ok(Json(state.store().list_articles().await?))
}

/// POST /articles
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ArticleInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse<ArticleId>>)> {
    let Json(input) = payload?;
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_owned()));
    }

    let article = state.store().create_article(&input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: article.id,
            message: "article published",
        }),
    ))
}
