//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Credentials (rate limited)
//! POST   /signup                   - Create a customer account
//! POST   /login                    - Exchange email/password for a bearer token
//!
//! # Caller (any valid token)
//! GET    /profile                  - Caller's profile
//! PUT    /profile                  - Update caller's name and phone
//! GET    /my-orders                - Orders placed with the caller's email
//!
//! # Public
//! POST   /orders                   - Checkout
//! GET    /categories               - Category listing
//! GET    /subcategories            - Subcategories of ?category_id=
//! GET    /products                 - Product listing
//! GET    /products/{id}            - Product detail
//! GET    /articles                 - Blog articles, newest first
//! POST   /contact                  - Contact form
//!
//! # Admin (admin token)
//! GET    /orders                   - All orders, newest first
//! GET    /orders/{id}              - Order with lines
//! PUT    /orders/{id}/status       - Change order status
//! POST   /categories               - Create category
//! PUT    /categories/{id}          - Rename category
//! DELETE /categories/{id}          - Delete category
//! POST   /subcategories            - Create subcategory
//! PUT    /subcategories/{id}       - Rename subcategory
//! DELETE /subcategories/{id}       - Delete subcategory
//! POST   /products                 - Create product
//! PUT    /products/{id}            - Replace product
//! DELETE /products/{id}            - Delete product
//! POST   /articles                 - Publish article
//! GET    /contact                  - Contact messages, newest first
//! PUT    /contact/{id}/read        - Mark contact message read
//! ```

pub mod account;
pub mod articles;
pub mod auth;
pub mod categories;
pub mod contact;
pub mod orders;
pub mod products;
pub mod subcategories;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Serialize;

use crate::state::AppState;

/// Body of responses that only confirm an action.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Body of responses that confirm a creation.
#[derive(Debug, Serialize)]
pub struct CreatedResponse<Id> {
    pub id: Id,
    pub message: &'static str,
}

/// Signup and login. The caller decides whether to rate limit them.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
}

/// Routes open to anyone, plus those guarded by the `Authenticated` extractor.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(account::profile).put(account::update_profile),
        )
        .route("/my-orders", get(account::my_orders))
        .route("/orders", post(orders::checkout))
        .route("/categories", get(categories::index))
        .route("/subcategories", get(subcategories::index))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/articles", get(articles::index))
        .route("/contact", post(contact::submit))
}

/// Back-office routes. Mount behind the admin gate.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", put(orders::update_status))
        .route("/categories", post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::rename).delete(categories::destroy),
        )
        .route("/subcategories", post(subcategories::create))
        .route(
            "/subcategories/{id}",
            put(subcategories::rename).delete(subcategories::destroy),
        )
        .route("/products", post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::destroy),
        )
        .route("/articles", post(articles::create))
        .route("/contact", get(contact::index))
        .route("/contact/{id}/read", put(contact::mark_read))
}
