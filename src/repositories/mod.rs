// src/repositories/mod.rs
//
// Persistence contracts. Services depend on the traits; the SQLite
// implementations are bound at startup and tests substitute in-memory fakes.

pub mod password_resets;
pub mod users;

#[cfg(test)]
pub mod memory;

use thiserror::Error;

pub use password_resets::{PasswordResetRepository, SqlitePasswordResetRepository};
pub use users::{SqliteUserRepository, UserRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
