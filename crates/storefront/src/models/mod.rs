//! Domain models for the storefront.
//!
//! - `account` - accounts, credentials and the profile view
//! - `order` - checkout input and order read models
//! - `catalog` - categories, products, articles and contact messages

pub mod account;
pub mod catalog;
pub mod order;

pub use account::{
    Account, AccountCredentials, LoginRequest, NewAccount, Profile, SignupRequest,
    UpdateProfileRequest,
};
pub use catalog::{
    Article, ArticleInput, Category, ContactInput, ContactMessage, NameInput, NewContactMessage,
    Product, ProductInput, Subcategory, SubcategoryInput, SubcategoryQuery,
};
pub use order::{
    CartItem, CheckoutRequest, NewOrder, NewOrderItem, OrderDetail, OrderLine, OrderSummary,
    UpdateStatusRequest,
};
