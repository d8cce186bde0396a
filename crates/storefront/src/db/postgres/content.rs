//! Article and contact message queries.

use async_trait::async_trait;

use akwaba_core::ContactMessageId;

use super::{PgStore, require_row};
use crate::db::{ContentStore, RepositoryError};
use crate::models::{Article, ArticleInput, ContactMessage, NewContactMessage};

#[async_trait]
impl ContentStore for PgStore {
    async fn list_articles(&self) -> Result<Vec<Article>, RepositoryError> {
        let articles = sqlx::query_as::<_, Article>(
            r"
            SELECT id, title, content, image_url, created_at
            FROM articles
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(articles)
    }

    async fn create_article(&self, article: &ArticleInput) -> Result<Article, RepositoryError> {
        let article = sqlx::query_as::<_, Article>(
            r"
            INSERT INTO articles (title, content, image_url)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, image_url, created_at
            ",
        )
        .bind(article.title.trim())
        .bind(&article.content)
        .bind(&article.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(article)
    }

    async fn create_contact_message(
        &self,
        message: &NewContactMessage,
    ) -> Result<ContactMessageId, RepositoryError> {
        let (id,): (ContactMessageId,) = sqlx::query_as(
            r"
            INSERT INTO contact_messages (full_name, email, subject, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&message.full_name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list_contact_messages(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let messages = sqlx::query_as::<_, ContactMessage>(
            r"
            SELECT id, full_name, email, subject, message, is_read, created_at
            FROM contact_messages
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn mark_contact_message_read(
        &self,
        id: ContactMessageId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }
}
