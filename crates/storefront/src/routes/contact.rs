//! Contact form handlers.
//!
//! Anyone may submit; only admins read.

use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};
use tracing::instrument;

use akwaba_core::ContactMessageId;

use super::MessageResponse;
use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{ContactInput, ContactMessage};
use crate::state::AppState;

/// Submit a contact message.
///
/// POST /contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactInput>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(input) = payload?;
    let message = input
        .validate()
        .map_err(|m| AppError::BadRequest(m.to_owned()))?;

    let id = state.store().create_contact_message(&message).await?;
    tracing::info!(contact_message_id = %id, "contact message received");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("message sent")),
    ))
}

/// GET /contact
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ContactMessage>>> {
    Ok(Json(state.store().list_contact_messages().await?))
}

/// PUT /contact/{id}/read
#[instrument(skip_all)]
pub async fn mark_read(
    State(state): State<AppState>,
    id: std::result::Result<Path<ContactMessageId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    state.store().mark_contact_message_read(id).await?;
    Ok(Json(MessageResponse::new("message marked as read")))
}
