//! Order domain types.
//!
//! Checkout input arrives as a [`CheckoutRequest`]; once validated it becomes a
//! [`NewOrder`] header plus its [`NewOrderItem`] lines. Read models
//! ([`OrderSummary`], [`OrderDetail`]) are what the listing endpoints return.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use akwaba_core::{Email, Money, OrderId, ProductId};

/// Checkout payload as sent by the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub delivery_method: String,
    #[serde(default)]
    pub shipping_city: String,
    #[serde(default)]
    pub shipping_commune: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub order_note: String,
    #[serde(default)]
    pub create_account: bool,
    pub items: Vec<CartItem>,
    pub total: Money,
}

/// One cart line as asserted by the caller.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CartItem {
    /// Product ID.
    pub id: ProductId,
    pub quantity: i32,
    /// Unit price at time of purchase.
    pub price: Money,
}

/// Validated order header, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub delivery_method: String,
    pub shipping_city: String,
    pub shipping_commune: String,
    pub shipping_address: String,
    pub order_note: String,
    pub create_account: bool,
    pub total: Money,
}

/// Validated order line, ready to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Money,
}

/// Row returned by order listings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer_name: String,
    pub total: Money,
    pub status: String,
    pub delivery_method: String,
    pub created_at: DateTime<Utc>,
}

/// Full order with its lines, for the back office.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderDetail {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub total: Money,
    pub status: String,
    pub delivery_method: String,
    pub shipping_city: String,
    pub shipping_commune: String,
    pub shipping_address: String,
    pub order_note: String,
    pub create_account: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderLine>,
}

/// One persisted order line joined with its product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
}

impl OrderLine {
    /// Unit price times quantity, `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_mul_quantity(self.quantity)
    }
}

/// Body of `PUT /orders/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Status every new order starts in.
pub const INITIAL_STATUS: &str = "pending";
