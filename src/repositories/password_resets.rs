// src/repositories/password_resets.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::auth::models::{NewPasswordResetToken, PasswordResetToken};

/// Password reset token persistence contract
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    async fn save(&self, token: NewPasswordResetToken)
        -> Result<PasswordResetToken, RepositoryError>;

    async fn find_by_token(&self, token: &str) -> Result<PasswordResetToken, RepositoryError>;

    /// Removes every token owned by `email`; zero matches is not an error
    async fn delete_by_email(&self, email: &str) -> Result<u64, RepositoryError>;
}

pub struct SqlitePasswordResetRepository {
    db: SqlitePool,
}

impl SqlitePasswordResetRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PasswordResetRepository for SqlitePasswordResetRepository {
    async fn save(
        &self,
        token: NewPasswordResetToken,
    ) -> Result<PasswordResetToken, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (email, token, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&token.email)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(PasswordResetToken {
            id: result.last_insert_rowid(),
            email: token.email,
            token: token.token,
            expires_at: token.expires_at,
            created_at: now,
        })
    }

    async fn find_by_token(&self, token: &str) -> Result<PasswordResetToken, RepositoryError> {
        sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, email, token, expires_at, created_at
            FROM password_reset_tokens
            WHERE token = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM password_reset_tokens WHERE email = ?")
            .bind(email)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }
}
