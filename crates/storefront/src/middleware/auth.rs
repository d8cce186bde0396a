//! Bearer token authorization.
//!
//! One gate, [`authorize`], backs both the role middleware mounted on admin
//! routers ([`require_admin`]) and the [`Authenticated`] extractor used by
//! routes that only need an identity. Handlers never read the
//! `Authorization` header themselves.
//!
//! Failures split two ways: anything wrong with the header or the token is
//! 401, a valid token with the wrong role is 403. The request passed on is
//! the one that came in.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use akwaba_core::Role;

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{Claims, TokenCodec};
use crate::state::AppState;

/// The token of an `Authorization: Bearer <token>` header.
///
/// The value must be exactly two space-separated parts with the scheme
/// spelled `Bearer`.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Verify the bearer token in `headers` and, when given, the role it carries.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` for a missing or malformed header and for
/// any token that fails verification. Returns `AppError::Forbidden` when the
/// token is valid but its role differs from `required`.
pub fn authorize(
    headers: &HeaderMap,
    tokens: &TokenCodec,
    required: Option<Role>,
) -> Result<Claims, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;

    let claims = tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "bearer token rejected");
        AppError::Unauthorized
    })?;

    if let Some(role) = required
        && claims.role != role
    {
        tracing::debug!(account_id = %claims.account_id, role = %claims.role, required = %role, "role mismatch");
        return Err(AppError::Forbidden);
    }

    set_sentry_user(&claims.account_id);
    Ok(claims)
}

/// Route layer admitting only admin tokens.
///
/// ```rust,ignore
/// Router::new()
///     .route("/orders", get(list_orders))
///     .route_layer(from_fn_with_state(state.clone(), require_admin))
/// ```
///
/// # Errors
///
/// See [`authorize`].
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(request.headers(), state.tokens(), Some(Role::Admin))?;
    Ok(next.run(request).await)
}

/// Extractor for any caller holding a valid token, whatever its role.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(Authenticated(claims): Authenticated) -> impl IntoResponse {
///     format!("account {}", claims.account_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, state.tokens(), None).map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;
    use secrecy::SecretString;

    use akwaba_core::AccountId;

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SecretString::from("g".repeat(40)))
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_shape() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        for bad in ["abc", "Bearer", "Bearer ", "bearer abc", "Basic abc", "Bearer a b", "Bearer  abc"] {
            assert_eq!(bearer_token(&headers(bad)), None, "{bad:?}");
        }
    }

    #[test]
    fn test_authorize_outcomes() {
        let codec = codec();
        let customer = codec.issue(AccountId::new(1), Role::Customer).unwrap();
        let admin = codec.issue(AccountId::new(2), Role::Admin).unwrap();

        let claims = authorize(&headers(&format!("Bearer {customer}")), &codec, None).unwrap();
        assert_eq!(claims.account_id, AccountId::new(1));

        let err = authorize(&headers(&format!("Bearer {customer}")), &codec, Some(Role::Admin));
        assert!(matches!(err, Err(AppError::Forbidden)));

        let claims = authorize(&headers(&format!("Bearer {admin}")), &codec, Some(Role::Admin));
        assert_eq!(claims.unwrap().role, Role::Admin);

        let err = authorize(&headers("Bearer not-a-token"), &codec, Some(Role::Admin));
        assert!(matches!(err, Err(AppError::Unauthorized)));

        let err = authorize(&HeaderMap::new(), &codec, None);
        assert!(matches!(err, Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_token_from_other_key_is_unauthorized_not_forbidden() {
        let foreign = TokenCodec::new(&SecretString::from("h".repeat(40)))
            .issue(AccountId::new(1), Role::Admin)
            .unwrap();
        let err = authorize(&headers(&format!("Bearer {foreign}")), &codec(), Some(Role::Admin));
        assert!(matches!(err, Err(AppError::Unauthorized)));
    }
}
