//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an admin account (password from AKWABA_ADMIN_PASSWORD)
//! AKWABA_ADMIN_PASSWORD=... akwaba-cli admin create -e admin@example.com -n "Admin Name"
//!
//! # Promote or demote an existing account
//! akwaba-cli admin set-role -e someone@example.com -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//! - `AKWABA_ADMIN_PASSWORD` - Password for `admin create`

use akwaba_core::{AccountId, Email, EmailError, Role};
use akwaba_storefront::db::{AccountStore, PgStore, RepositoryError};
use akwaba_storefront::models::NewAccount;
use akwaba_storefront::services::AuthError;
use akwaba_storefront::services::auth::{hash_password, validate_password};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;

use super::{MissingEnvVar, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVar),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: customer, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] AuthError),

    /// Account already exists.
    #[error("Account already exists with email: {0}")]
    UserExists(String),

    #[error("No account with email: {0}")]
    UserNotFound(String),
}

async fn connect() -> Result<PgStore, AdminError> {
    let database_url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;
    Ok(PgStore::new(pool))
}

/// Create a new admin account.
///
/// # Arguments
///
/// * `email` - Login email address
/// * `name` - Display name
/// * `phone` - Contact phone, may be empty
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `AdminError` if the input is invalid, the password is missing or
/// too short, or the email is already registered.
pub async fn create(email: &str, name: &str, phone: &str) -> Result<AccountId, AdminError> {
    let email = Email::parse(email)?;
    let store = connect().await?;

    let password = std::env::var("AKWABA_ADMIN_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| MissingEnvVar("AKWABA_ADMIN_PASSWORD"))?;
    validate_password(password.expose_secret())?;
    let password_hash = hash_password(password.expose_secret())?;

    tracing::info!("Creating admin account: {}", email);

    let account = store
        .create_account(&NewAccount {
            email: email.clone(),
            password_hash,
            full_name: name.trim().to_owned(),
            phone: phone.trim().to_owned(),
            role: Role::Admin,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Admin account created successfully! ID: {}, Email: {}",
        account.id,
        account.email
    );
    Ok(account.id)
}

/// Change the role of an existing account.
///
/// # Errors
///
/// Returns `AdminError` if the role is unknown or no account has this email.
pub async fn set_role(email: &str, role: &str) -> Result<(), AdminError> {
    let role: Role = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email)?;
    let store = connect().await?;

    store.set_role(&email, role).await.map_err(|e| match e {
        RepositoryError::NotFound => AdminError::UserNotFound(email.to_string()),
        other => AdminError::Repository(other),
    })?;

    tracing::info!("Role of {} set to {}", email, role);
    Ok(())
}
