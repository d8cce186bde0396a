//! Database operations for the storefront.
//!
//! # Tables
//!
//! - `users` - Accounts (email, password hash, display name, role)
//! - `orders` / `order_items` - Checkout header and its lines
//! - `categories`, `subcategories`, `products` - Catalog
//! - `articles` - Blog posts
//! - `contact_messages` - Contact form submissions
//!
//! # Backends
//!
//! Handlers and services only see the traits defined here. [`PgStore`] is the
//! production backend; `MemoryStore` (feature `test-util`) backs the test
//! suites and can inject failures into checkout transactions.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p akwaba-cli -- migrate
//! ```

#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use akwaba_core::{AccountId, CategoryId, ContactMessageId, Email, OrderId, ProductId, Role, SubcategoryId};

use crate::models::{
    Account, AccountCredentials, Article, ArticleInput, Category, ContactMessage, NewAccount,
    NewContactMessage, NewOrder, NewOrderItem, OrderDetail, OrderSummary, Product, ProductInput,
    Subcategory,
};

#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (unique email, row still referenced, unknown parent).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    async fn create_account(&self, account: &NewAccount) -> Result<Account, RepositoryError>;

    /// Look up an account and its password hash by exact email.
    ///
    /// Takes the raw login input so malformed addresses cost the same lookup
    /// as unknown ones.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, RepositoryError>;

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Replace display name and phone. `NotFound` if the account is gone.
    async fn update_profile(
        &self,
        id: AccountId,
        full_name: &str,
        phone: &str,
    ) -> Result<(), RepositoryError>;

    /// Administrative role change. `NotFound` if no account has this email.
    async fn set_role(&self, email: &Email, role: Role) -> Result<(), RepositoryError>;
}

/// A single open checkout transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) discards
/// everything written through it.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Insert the order header and return its generated id.
    async fn insert_header(&mut self, order: &NewOrder) -> Result<OrderId, RepositoryError>;

    async fn insert_item(
        &mut self,
        order_id: OrderId,
        item: &NewOrderItem,
    ) -> Result<(), RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Open a transaction for one checkout.
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, RepositoryError>;

    /// All orders, newest first.
    async fn list_orders(&self) -> Result<Vec<OrderSummary>, RepositoryError>;

    /// Orders placed with this contact email, newest first.
    async fn list_orders_for_email(
        &self,
        email: &Email,
    ) -> Result<Vec<OrderSummary>, RepositoryError>;

    /// One order with its lines.
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError>;

    async fn update_order_status(&self, id: OrderId, status: &str) -> Result<(), RepositoryError>;
}

/// Catalog persistence: categories, subcategories and products.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;
    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError>;
    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<(), RepositoryError>;
    /// `Conflict` while subcategories or products still reference it.
    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError>;

    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, RepositoryError>;
    /// `Conflict` if the parent category does not exist.
    async fn create_subcategory(
        &self,
        name: &str,
        category_id: CategoryId,
    ) -> Result<Subcategory, RepositoryError>;
    async fn rename_subcategory(
        &self,
        id: SubcategoryId,
        name: &str,
    ) -> Result<(), RepositoryError>;
    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<(), RepositoryError>;

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn create_product(&self, product: &ProductInput) -> Result<ProductId, RepositoryError>;
    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductInput,
    ) -> Result<(), RepositoryError>;
    /// `Conflict` while order lines reference the product.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Blog and contact form persistence.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Articles, newest first.
    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError>;
    async fn create_article(&self, article: &ArticleInput) -> Result<Article, RepositoryError>;

    async fn create_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessageId, RepositoryError>;
    /// Messages, newest first.
    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, RepositoryError>;
    async fn mark_contact_message_read(
        &self,
        id: ContactMessageId,
    ) -> Result<(), RepositoryError>;
}

/// Everything the HTTP layer needs from storage.
#[async_trait]
pub trait Store: AccountStore + OrderStore + CatalogStore + ContentStore {
    /// Cheap connectivity test behind the readiness endpoint.
    async fn ping(&self) -> Result<(), RepositoryError>;
}
