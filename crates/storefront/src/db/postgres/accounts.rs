//! Account queries.

use async_trait::async_trait;

use akwaba_core::{AccountId, Email, Role};

use super::{PgStore, constraint_error, require_row};
use crate::db::{AccountStore, RepositoryError};
use crate::models::{Account, AccountCredentials, NewAccount};

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    account: Account,
    password_hash: String,
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        sqlx::query_as::<_, Account>(
            r"
            INSERT INTO users (email, password_hash, full_name, phone, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, full_name, phone, role, created_at
            ",
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.full_name)
        .bind(&account.phone)
        .bind(account.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "email already exists"))
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<AccountCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r"
            SELECT id, email, full_name, phone, role, created_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| AccountCredentials {
            account: r.account,
            password_hash: r.password_hash,
        }))
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let account = sqlx::query_as::<_, Account>(
            r"
            SELECT id, email, full_name, phone, role, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn update_profile(
        &self,
        id: AccountId,
        full_name: &str,
        phone: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET full_name = $1, phone = $2 WHERE id = $3")
            .bind(full_name)
            .bind(phone)
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }

    async fn set_role(&self, email: &Email, role: Role) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE email = $2")
            .bind(role)
            .bind(email)
            .execute(&self.pool)
            .await?;
        require_row(result.rows_affected())
    }
}
