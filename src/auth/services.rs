//! Account flows: registration, login and the password reset lifecycle
//!
//! A reset token moves `issued -> consumed | expired | superseded`; every
//! outcome is terminal. Issuance is delete-then-insert without a
//! transaction, so two concurrent requests for the same email can leave two
//! live tokens behind. One active token per email is a target, not a
//! guarantee.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::jwt::{JwtSigner, TokenError};
use super::models::NewPasswordResetToken;
use super::password::{PasswordError, PasswordHasher};
use crate::common::{safe_email_log, safe_token_log};
use crate::repositories::{PasswordResetRepository, RepositoryError, UserRepository};
use crate::services::EmailService;
use crate::users::models::{NewUser, User};

/// Lifetime of a password reset token
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

const RESET_TOKEN_BYTES: usize = 32;

// Hashed once; unknown-email logins verify against it
const DUMMY_PASSWORD: &str = "auth-api-dummy-password";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already registered")]
    EmailAlreadyRegistered,

    /// Covers both an unknown email and a wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("token expired")]
    TokenExpired,

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Successful login: the session token and the sanitized user
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

/// 32 bytes from the OS CSPRNG, URL-safe base64 without padding
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    resets: Arc<dyn PasswordResetRepository>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<JwtSigner>,
    email: EmailService,
    frontend_url: String,
    dummy_digest: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        resets: Arc<dyn PasswordResetRepository>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<JwtSigner>,
        email: EmailService,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            resets,
            hasher,
            signer,
            email,
            frontend_url: frontend_url.into(),
            dummy_digest: OnceCell::new(),
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        match self.users.find_by_email(email).await {
            Ok(_) => {
                warn!(email = %safe_email_log(email), "Registration rejected: email already registered");
                return Err(AuthError::EmailAlreadyRegistered);
            }
            Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = self.hash_password(password).await?;

        let user = self
            .users
            .save(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration for the same email
                RepositoryError::DuplicateEmail => AuthError::EmailAlreadyRegistered,
                other => AuthError::Repository(other),
            })?;

        self.email.send_welcome_email(&user.email, &user.name);

        info!(user_id = user.id, email = %safe_email_log(&user.email), "User registered");

        Ok(user.sanitized())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                debug!(email = %safe_email_log(email), "Login failed: unknown email");
                self.verify_against_dummy(password).await;
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self.verify_password(password, &user.password_hash).await? {
            debug!(user_id = user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(user.id, &user.email)?;

        info!(user_id = user.id, "User logged in");

        Ok(LoginResult {
            token,
            user: user.sanitized(),
        })
    }

    /// Issues a reset token and emails the link. An unknown email is a
    /// silent success so callers cannot probe which addresses exist.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                debug!(email = %safe_email_log(email), "Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

        // Supersede earlier tokens; a failure here only leaves stale rows behind
        if let Err(e) = self.resets.delete_by_email(&user.email).await {
            warn!(error = %e, user_id = user.id, "Failed to remove previous reset tokens");
        }

        self.resets
            .save(NewPasswordResetToken {
                email: user.email.clone(),
                token: token.clone(),
                expires_at,
            })
            .await?;

        let reset_link = self.reset_link(&token, &user.email);
        self.email.send_reset_password_email(&user.email, &reset_link);

        info!(
            user_id = user.id,
            token = %safe_token_log(&token),
            expires_at = %expires_at,
            "Password reset token issued"
        );

        Ok(())
    }

    /// Consumes a reset token and sets the new password.
    /// Matching the confirmation field is the request boundary's job.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let reset = match self.resets.find_by_token(token).await {
            Ok(reset) => reset,
            Err(RepositoryError::NotFound) => {
                warn!(token = %safe_token_log(token), "Password reset with unknown token");
                return Err(AuthError::InvalidOrExpiredToken);
            }
            Err(e) => return Err(e.into()),
        };

        if reset.is_expired_at(Utc::now()) {
            warn!(token = %safe_token_log(token), expires_at = %reset.expires_at, "Password reset with expired token");
            return Err(AuthError::TokenExpired);
        }

        // Owner is looked up by the stored email, not a foreign key
        let mut user = match self.users.find_by_email(&reset.email).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                warn!(email = %safe_email_log(&reset.email), "Reset token owner no longer exists");
                return Err(AuthError::UserNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        user.password_hash = self.hash_password(new_password).await?;

        self.users.update(&user).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        // Consumes this token along with any stale siblings
        if let Err(e) = self.resets.delete_by_email(&user.email).await {
            warn!(error = %e, user_id = user.id, "Password updated but reset tokens were not removed");
        }

        info!(user_id = user.id, "Password reset completed");

        Ok(())
    }

    fn reset_link(&self, token: &str, email: &str) -> String {
        format!(
            "{}/reset-password?token={}&email={}",
            self.frontend_url,
            urlencoding::encode(token),
            urlencoding::encode(email)
        )
    }

    /// Spends one verification on a throwaway digest so an unknown email
    /// costs about as much as a wrong password.
    async fn verify_against_dummy(&self, password: &str) {
        let digest = match self
            .dummy_digest
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD))
            .await
        {
            Ok(digest) => digest.clone(),
            Err(e) => {
                warn!(error = %e, "Failed to prepare dummy password digest");
                return;
            }
        };

        if let Err(e) = self.verify_password(password, &digest).await {
            warn!(error = %e, "Dummy password verification failed");
        }
    }

    // Hashing runs on the blocking pool.
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let digest = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))??;
        Ok(digest)
    }

    async fn verify_password(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let digest = digest.to_string();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?;
        Ok(matches)
    }
}
