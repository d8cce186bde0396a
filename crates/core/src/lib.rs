//! Akwaba Core - Shared domain types.
//!
//! This crate provides the types shared by every Akwaba component:
//! - `storefront` - Public JSON API (catalog, checkout, accounts, admin CRUD)
//! - `cli` - Command-line tools for migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP. With the `postgres` feature enabled the types also know how to
//! encode and decode themselves through sqlx.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, roles and money

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
