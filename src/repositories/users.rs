// src/repositories/users.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, error};

use super::RepositoryError;
use crate::users::models::{NewUser, User};

/// User persistence contract
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; a taken email yields [`RepositoryError::DuplicateEmail`]
    async fn save(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<User, RepositoryError>;

    /// Persists name, password hash and verification time; bumps `updated_at`
    async fn update(&self, user: &User) -> Result<User, RepositoryError>;

    /// Returns one page (1-based) plus the search-filtered total.
    /// A non-empty `search` matches users whose name or email starts with it.
    async fn find_all(
        &self,
        page: i64,
        limit: i64,
        search: &str,
    ) -> Result<(Vec<User>, i64), RepositoryError>;
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, email_verified_at, created_at, updated_at";

pub struct SqliteUserRepository {
    db: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Escapes LIKE wildcards so user input only ever matches literally
fn like_prefix_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 1);
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn save(&self, user: NewUser) -> Result<User, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::DuplicateEmail
            }
            _ => {
                error!(error = %e, "Database error inserting user");
                RepositoryError::Database(e)
            }
        })?;

        self.find_by_id(result.last_insert_rowid()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = ?, password_hash = ?, email_verified_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.email_verified_at)
        .bind(Utc::now())
        .bind(user.id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(user.id).await
    }

    async fn find_all(
        &self,
        page: i64,
        limit: i64,
        search: &str,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        // Saturates for absurd page numbers; SQLite then returns no rows
        let offset = (page - 1).saturating_mul(limit);

        // Prefix match keeps the name/email indexes usable on large tables
        let (total, users) = if search.is_empty() {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(&self.db)
                .await?;

            let users = sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users ORDER BY id ASC LIMIT ? OFFSET ?",
                USER_COLUMNS
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

            (total, users)
        } else {
            let pattern = like_prefix_pattern(search);

            let total: i64 = sqlx::query_scalar(
                r"SELECT COUNT(*) FROM users WHERE name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\'",
            )
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(&self.db)
            .await?;

            let users = sqlx::query_as::<_, User>(&format!(
                r"SELECT {} FROM users WHERE name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\' ORDER BY id ASC LIMIT ? OFFSET ?",
                USER_COLUMNS
            ))
            .bind(&pattern)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

            (total, users)
        };

        debug!(page, limit, total, returned = users.len(), "Fetched user page");

        Ok((users, total))
    }
}
