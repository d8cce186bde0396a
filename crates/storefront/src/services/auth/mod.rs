//! Authentication service.
//!
//! Password signup and login, bearer token issuance, and the profile of the
//! account a token names.

mod error;
pub mod token;

pub use error::AuthError;
pub use token::{Claims, TOKEN_TTL, TokenCodec, TokenError};

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use akwaba_core::{AccountId, Email, Role};

use crate::db::{AccountStore, RepositoryError};
use crate::models::account::join_full_name;
use crate::models::{Account, NewAccount, Profile, SignupRequest, UpdateProfileRequest};

/// Minimum password length, in characters.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash verified when the login email matches no account, so unknown emails
/// cost the same as wrong passwords.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("akwaba-no-such-account").unwrap_or_default());

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub role: Role,
    pub display_name: String,
}

/// Authentication service.
///
/// Borrows the account store and the token codec for the duration of a request.
pub struct AuthService<'a, S: AccountStore + ?Sized> {
    accounts: &'a S,
    tokens: &'a TokenCodec,
}

impl<'a, S: AccountStore + ?Sized> AuthService<'a, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a S, tokens: &'a TokenCodec) -> Self {
        Self { accounts, tokens }
    }

    /// Register a customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::MissingField` if the name is blank.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Account, AuthError> {
        let email = Email::parse(&request.email)?;
        validate_password(&request.password)?;
        let full_name = request.full_name.trim();
        if full_name.is_empty() {
            return Err(AuthError::MissingField("full_name"));
        }

        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|_| AuthError::PasswordHash)??;

        let account = NewAccount {
            email,
            password_hash,
            full_name: full_name.to_owned(),
            phone: request.phone.trim().to_owned(),
            role: Role::Customer,
        };

        let account = self
            .accounts
            .create_account(&account)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %account.id, "account created");
        Ok(account)
    }

    /// Check credentials and issue a token.
    ///
    /// Malformed email, unknown email and wrong password all end in the same
    /// `InvalidCredentials` after one credential lookup and one password
    /// verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        // Stored emails are all well-formed, so a malformed one simply misses
        let credentials = self.accounts.find_credentials(email.trim()).await?;

        let (account, hash) = match credentials {
            Some(found) => (Some(found.account), found.password_hash),
            None => (None, DUMMY_HASH.clone()),
        };

        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|_| AuthError::PasswordHash)?;

        let Some(account) = account.filter(|_| verified) else {
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.tokens.issue(account.id, account.role)?;
        Ok(LoginOutcome {
            token,
            role: account.role,
            display_name: account.full_name,
        })
    }

    /// Profile of the account a token names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account was deleted after
    /// the token was issued.
    pub async fn profile(&self, account_id: AccountId) -> Result<Profile, AuthError> {
        self.accounts
            .get_account(account_id)
            .await?
            .map(Profile::from)
            .ok_or(AuthError::AccountNotFound)
    }

    /// Replace name and phone of the account a token names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if both name parts are blank.
    /// Returns `AuthError::AccountNotFound` if the account no longer exists.
    pub async fn update_profile(
        &self,
        account_id: AccountId,
        update: &UpdateProfileRequest,
    ) -> Result<(), AuthError> {
        let full_name = join_full_name(update.first_name.trim(), update.last_name.trim());
        if full_name.is_empty() {
            return Err(AuthError::MissingField("first_name"));
        }

        self.accounts
            .update_profile(account_id, &full_name, update.phone.trim())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            })
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash. Unparseable hashes never verify.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
