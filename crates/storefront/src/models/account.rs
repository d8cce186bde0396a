//! Account domain types.
//!
//! These types represent validated domain objects separate from request bodies.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use akwaba_core::{AccountId, Email, Role};

/// A storefront account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Login email, unique and compared exactly.
    pub email: Email,
    /// Display name stored as one combined field.
    pub full_name: String,
    /// Contact phone number.
    pub phone: String,
    /// Permission level.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// An account together with its stored password hash.
///
/// Only the login path reads this; the hash never leaves the auth service.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: Account,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Data required to insert a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub password_hash: String,
    pub full_name: String,
    pub phone: String,
    pub role: Role,
}

/// Profile view returned to the account owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub role: Role,
}

impl From<Account> for Profile {
    fn from(account: Account) -> Self {
        let (first_name, last_name) = split_full_name(&account.full_name);
        Self {
            id: account.id,
            first_name,
            last_name,
            email: account.email,
            phone: account.phone,
            role: account.role,
        }
    }
}

/// Body of `POST /signup`. There is no role field; new accounts are customers.
#[derive(Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Body of `POST /login`.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `PUT /profile`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
}

/// Split a combined name at its first whitespace.
///
/// Everything after the break is the last name, kept as typed.
#[must_use]
pub fn split_full_name(full_name: &str) -> (String, String) {
    match full_name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_owned(), rest.to_owned()),
        None => (full_name.to_owned(), String::new()),
    }
}

/// Recombine first and last name into the stored form.
#[must_use]
pub fn join_full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_owned()
}
