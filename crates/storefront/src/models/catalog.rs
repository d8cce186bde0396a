//! Catalog, blog and contact types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use akwaba_core::{ArticleId, CategoryId, ContactMessageId, Email, Money, ProductId, SubcategoryId};

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Body for creating or renaming a category or subcategory.
#[derive(Debug, Clone, Deserialize)]
pub struct NameInput {
    pub name: String,
}

impl NameInput {
    /// Trimmed name, rejecting blanks.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when the name is empty.
    pub fn validated(&self) -> Result<&str, &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name is required");
        }
        Ok(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubcategoryInput {
    pub name: String,
    pub category_id: Option<CategoryId>,
}

/// Query string of `GET /subcategories`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubcategoryQuery {
    pub category_id: Option<CategoryId>,
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock_quantity: i32,
    pub image_url: String,
    pub category_id: Option<CategoryId>,
}

/// Body for creating or replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    #[serde(default)]
    pub stock_quantity: i32,
    /// Public URL of an already uploaded image.
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl ProductInput {
    /// # Errors
    ///
    /// Returns a client-facing message for the first invalid field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.price.is_negative() {
            return Err("price cannot be negative");
        }
        if !self.price.is_storable() {
            return Err("price must have at most two decimals and fewer than ten digits");
        }
        if self.stock_quantity < 0 {
            return Err("stock_quantity cannot be negative");
        }
        Ok(())
    }
}

// =============================================================================
// Articles
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: String,
}

// =============================================================================
// Contact messages
// =============================================================================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInput {
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A contact message that passed validation.
#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub full_name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

impl ContactInput {
    /// # Errors
    ///
    /// Returns a client-facing message when a field is blank or the email is invalid.
    pub fn validate(self) -> Result<NewContactMessage, &'static str> {
        let blank = [&self.full_name, &self.email, &self.subject, &self.message]
            .iter()
            .any(|field| field.trim().is_empty());
        if blank {
            return Err("all fields are required");
        }
        let email = Email::parse(&self.email).map_err(|_| "invalid email address")?;
        Ok(NewContactMessage {
            full_name: self.full_name.trim().to_owned(),
            email,
            subject: self.subject.trim().to_owned(),
            message: self.message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(price: i64, stock: i32) -> ProductInput {
        ProductInput {
            name: "Bavoir coton".to_owned(),
            description: String::new(),
            price: Money::new(Decimal::from(price)),
            stock_quantity: stock,
            image_url: String::new(),
            category_id: None,
        }
    }

    #[test]
    fn test_name_input_trims_and_rejects_blank() {
        let input = NameInput { name: "  Jouets ".to_owned() };
        assert_eq!(input.validated().unwrap(), "Jouets");
        assert!(NameInput { name: "   ".to_owned() }.validated().is_err());
    }

    #[test]
    fn test_product_validation() {
        assert!(product(1500, 3).validate().is_ok());
        assert!(product(0, 0).validate().is_ok());
        assert_eq!(product(-1, 3).validate(), Err("price cannot be negative"));
        assert!(product(10_000_000_000, 3).validate().is_err());
        assert_eq!(
            product(10, -1).validate(),
            Err("stock_quantity cannot be negative")
        );
    }

    #[test]
    fn test_contact_validation() {
        let ok = ContactInput {
            full_name: "Awa".to_owned(),
            email: "awa@example.ci".to_owned(),
            subject: "Livraison".to_owned(),
            message: "Bonjour".to_owned(),
        };
        assert_eq!(ok.clone().validate().unwrap().email.as_str(), "awa@example.ci");

        let missing = ContactInput {
            subject: " ".to_owned(),
            ..ok.clone()
        };
        assert_eq!(missing.validate().unwrap_err(), "all fields are required");

        let bad_email = ContactInput {
            email: "awa".to_owned(),
            ..ok
        };
        assert_eq!(bad_email.validate().unwrap_err(), "invalid email address");
    }
}
