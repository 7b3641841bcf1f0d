use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::models::{User, UsersPage};
use crate::repositories::{RepositoryError, UserRepository};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => UserServiceError::UserNotFound,
            other => UserServiceError::Repository(other),
        }
    }
}

/// Clamps paging input: page >= 1, limit within 1..=100
pub fn normalize_paging(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    (page, limit)
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get_profile(&self, user_id: i64) -> Result<User, UserServiceError> {
        let user = self.users.find_by_id(user_id).await?;
        Ok(user.sanitized())
    }

    pub async fn get_all_users(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
        search: Option<&str>,
    ) -> Result<UsersPage, UserServiceError> {
        let (page, limit) = normalize_paging(page, limit);
        let search = search.map(str::trim).unwrap_or_default();

        let (users, total) = self.users.find_all(page, limit, search).await?;

        debug!(page, limit, total, search = %search, "Listing users");

        Ok(UsersPage {
            users: users.into_iter().map(User::sanitized).collect(),
            total,
            page,
            limit,
        })
    }
}
