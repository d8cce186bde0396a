//! Handlers acting on the caller's own account.
//!
//! Every handler here takes `Authenticated`; the account is always the one the
//! token names, never one from the request body.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;

use super::MessageResponse;
use crate::db::{AccountStore, OrderStore};
use crate::error::{AppError, Result};
use crate::middleware::Authenticated;
use crate::models::{OrderSummary, Profile, UpdateProfileRequest};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Caller's profile.
///
/// GET /profile
#[instrument(skip_all, fields(account_id = %claims.account_id))]
pub async fn profile(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Profile>> {
    let auth = AuthService::new(state.store(), state.tokens());
    let profile = auth.profile(claims.account_id).await?;
    Ok(Json(profile))
}

/// Update the caller's name and phone.
///
/// PUT /profile
#[instrument(skip_all, fields(account_id = %claims.account_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Json(update) = payload?;
    let auth = AuthService::new(state.store(), state.tokens());
    auth.update_profile(claims.account_id, &update).await?;
    Ok(Json(MessageResponse::new("profile updated")))
}

/// Orders placed with the caller's email.
///
/// GET /my-orders
#[instrument(skip_all, fields(account_id = %claims.account_id))]
pub async fn my_orders(
    State(state): State<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<Json<Vec<OrderSummary>>> {
    let store = state.store();
    let account = store
        .get_account(claims.account_id)
        .await?
        .ok_or(AppError::Auth(AuthError::AccountNotFound))?;
    let orders = store.list_orders_for_email(&account.email).await?;
    Ok(Json(orders))
}
