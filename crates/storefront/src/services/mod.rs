//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Signup, login, bearer tokens and the caller's profile
//! - `checkout` - Validating a cart and committing it as one order
//!
//! Services borrow storage through the traits in [`crate::db`], so handlers
//! construct them per request from [`AppState`](crate::state::AppState).

pub mod auth;
pub mod checkout;

pub use auth::{AuthError, AuthService, Claims, LoginOutcome, TokenCodec, TokenError};
pub use checkout::{CheckoutError, CheckoutService, CommitStage};
