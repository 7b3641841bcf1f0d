// src/repositories/memory.rs
//! In-memory repository fakes for service tests

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{PasswordResetRepository, RepositoryError, UserRepository};
use crate::auth::models::{NewPasswordResetToken, PasswordResetToken};
use crate::users::models::{NewUser, User};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn remove_by_email(&self, email: &str) {
        self.users.write().await.retain(|u| u.email != email);
    }
}

// Mirrors SQLite's LIKE, which folds ASCII case only
fn starts_with_ignore_ascii_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::DuplicateEmail);
        }

        let now = Utc::now();
        let saved = User {
            id: users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        };
        users.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, RepositoryError> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, user: &User) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;

        *stored = User {
            updated_at: Utc::now(),
            ..user.clone()
        };
        Ok(stored.clone())
    }

    async fn find_all(
        &self,
        page: i64,
        limit: i64,
        search: &str,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let users = self.users.read().await;
        let matching: Vec<&User> = users
            .iter()
            .filter(|u| {
                search.is_empty()
                    || starts_with_ignore_ascii_case(&u.name, search)
                    || starts_with_ignore_ascii_case(&u.email, search)
            })
            .collect();

        let total = matching.len() as i64;
        let offset = (page - 1).saturating_mul(limit).max(0) as usize;
        let page_items = matching
            .into_iter()
            .skip(offset)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page_items, total))
    }
}

#[derive(Default)]
pub struct InMemoryPasswordResetRepository {
    tokens: RwLock<Vec<PasswordResetToken>>,
    fail_saves: AtomicBool,
}

impl InMemoryPasswordResetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail with a database error
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub async fn all(&self) -> Vec<PasswordResetToken> {
        self.tokens.read().await.clone()
    }

    /// Inserts a row as-is, bypassing the service (e.g. an already expired token)
    pub async fn insert_raw(&self, token: PasswordResetToken) {
        self.tokens.write().await.push(token);
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryPasswordResetRepository {
    async fn save(
        &self,
        token: NewPasswordResetToken,
    ) -> Result<PasswordResetToken, RepositoryError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }

        let mut tokens = self.tokens.write().await;
        let saved = PasswordResetToken {
            id: tokens.iter().map(|t| t.id).max().unwrap_or(0) + 1,
            email: token.email,
            token: token.token,
            expires_at: token.expires_at,
            created_at: Utc::now(),
        };
        tokens.push(saved.clone());
        Ok(saved)
    }

    async fn find_by_token(&self, token: &str) -> Result<PasswordResetToken, RepositoryError> {
        self.tokens
            .read()
            .await
            .iter()
            .rev()
            .find(|t| t.token == token)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| t.email != email);
        Ok((before - tokens.len()) as u64)
    }
}
