//! Signup and login handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use akwaba_core::{AccountId, Role};

use super::CreatedResponse;
use crate::error::Result;
use crate::models::{LoginRequest, SignupRequest};
use crate::services::AuthService;
use crate::state::AppState;

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub display_name: String,
}

/// Create a customer account.
///
/// POST /signup
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse<AccountId>>)> {
    let Json(request) = payload?;
    let auth = AuthService::new(state.store(), state.tokens());
    let account = auth.signup(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: account.id,
            message: "account created",
        }),
    ))
}

/// Exchange email and password for a bearer token.
///
/// POST /login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(request) = payload?;
    let auth = AuthService::new(state.store(), state.tokens());

    let outcome = auth
        .login(&request.email, &request.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "login rejected"))?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        role: outcome.role,
        display_name: outcome.display_name,
    }))
}
