//! Account queries backing the PostgreSQL credential store.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{AuthError, CredentialStore};
use crate::models::auth::{Account, NewAccount, ProfileUpdate};

const ACCOUNT_COLUMNS: &str = "id, username, password_hash, role, bio";

/// [`CredentialStore`] over the `users` table.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AuthError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE username = $1");
        let row = sqlx::query_as::<_, Account>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AuthError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, AuthError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn save(&self, account: NewAccount) -> Result<Account, AuthError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(account.role)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(saved) => Ok(saved),
            // Lost a race against a concurrent registration.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::Conflict(account.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<Account>, AuthError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query_as::<_, Account>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_profile(
        &self,
        id: i64,
        update: ProfileUpdate,
    ) -> Result<Option<Account>, AuthError> {
        let sql = format!(
            "UPDATE users SET username = $2, bio = $3 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let result = sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(&update.username)
            .bind(&update.bio)
            .fetch_optional(&self.pool)
            .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AuthError::Conflict(update.username))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
