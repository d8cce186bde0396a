//! Authentication error types.

use thiserror::Error;

use super::token::TokenError;
use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format at signup.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] akwaba_core::EmailError),

    /// Wrong password, unknown email or unparseable login email.
    ///
    /// Every login failure is reported through this one variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A required signup or profile field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Account named by a valid token no longer exists.
    #[error("account not found")]
    AccountNotFound,

    /// Email already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token could not be signed.
    #[error(transparent)]
    Token(#[from] TokenError),
}
