//! Category, subcategory and product queries.

use async_trait::async_trait;

use akwaba_core::{CategoryId, ProductId, SubcategoryId};

use super::{PgStore, constraint_error, require_row};
use crate::db::{CatalogStore, RepositoryError};
use crate::models::{Category, Product, ProductInput, Subcategory};

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn rename_category(&self, id: CategoryId, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE categories SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "category is still in use"))?;
        require_row(result.rows_affected())
    }

    async fn list_subcategories(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, RepositoryError> {
        let subcategories = sqlx::query_as::<_, Subcategory>(
            "SELECT id, name, category_id FROM subcategories WHERE category_id = $1 ORDER BY id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(subcategories)
    }

    async fn create_subcategory(
        &self,
        name: &str,
        category_id: CategoryId,
    ) -> Result<Subcategory, RepositoryError> {
        sqlx::query_as::<_, Subcategory>(
            r"
            INSERT INTO subcategories (name, category_id)
            VALUES ($1, $2)
            RETURNING id, name, category_id
            ",
        )
        .bind(name)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "unknown category"))
    }

    async fn rename_subcategory(
        &self,
        id: SubcategoryId,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE subcategories SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }

    async fn delete_subcategory(&self, id: SubcategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM subcategories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, stock_quantity, image_url, category_id
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, price, stock_quantity, image_url, category_id
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn create_product(&self, product: &ProductInput) -> Result<ProductId, RepositoryError> {
        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO products (name, description, price, stock_quantity, image_url, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(&product.image_url)
        .bind(product.category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "unknown category"))?;
        Ok(id)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &ProductInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $1, description = $2, price = $3, stock_quantity = $4,
                image_url = $5, category_id = $6
            WHERE id = $7
            ",
        )
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(&product.image_url)
        .bind(product.category_id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "unknown category"))?;
        require_row(result.rows_affected())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "product is referenced by orders"))?;
        require_row(result.rows_affected())
    }
}
