//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the account id and role. The signing key is
//! injected from configuration; it never lives in code.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use akwaba_core::{AccountId, Role};

/// How long an issued token stays valid.
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub account_id: AccountId,
    pub role: Role,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: u64,
}

/// Token verification and signing failures.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    /// Bad signature, wrong algorithm, malformed structure or claims.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token does not name an account")]
    UnassignedAccount,

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl: TOKEN_TTL,
        }
    }

    /// Issue a token valid for [`TOKEN_TTL`] from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, account_id: AccountId, role: Role) -> Result<String, TokenError> {
        self.issue_at(account_id, role, jsonwebtoken::get_current_timestamp())
    }

    /// Issue a token as if it had been signed at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue_at(
        &self,
        account_id: AccountId,
        role: Role,
        issued_at: u64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            account_id,
            role,
            exp: issued_at.saturating_add(self.ttl.as_secs()),
            iat: issued_at,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Verify signature, algorithm and expiry, then return the claims.
    ///
    /// A token is expired once the current second reaches `exp`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens, `TokenError::Invalid`
    /// for anything that fails to verify or decode, and
    /// `TokenError::UnassignedAccount` when the id is zero or negative.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })?;
        let claims = data.claims;

        if claims.exp <= jsonwebtoken::get_current_timestamp() {
            return Err(TokenError::Expired);
        }
        if !claims.account_id.is_assigned() {
            return Err(TokenError::UnassignedAccount);
        }
        Ok(claims)
    }
}
