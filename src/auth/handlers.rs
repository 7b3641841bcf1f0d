//! Authentication handlers

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::extractors::AuthedUser;
use super::models::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
use super::services::{AuthError, LoginResult};
use super::validators::{
    ForgotPasswordValidator, LoginValidator, RegisterValidator, ResetPasswordValidator,
};
use crate::common::{safe_email_log, ApiError, AppState, Validator};
use crate::repositories::RepositoryError;
use crate::users::services::UserServiceError;

/// Shown for every forgot-password request, whatever actually happened
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If your email is registered, you will receive a reset link.";

pub const RESET_PASSWORD_MESSAGE: &str = "Password has been reset successfully.";

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyRegistered
            | AuthError::InvalidOrExpiredToken
            | AuthError::TokenExpired
            | AuthError::UserNotFound => ApiError::BadRequest(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::Repository(RepositoryError::Database(e)) => ApiError::DatabaseError(e),
            other => ApiError::InternalServer(other.to_string()),
        }
    }
}

/// POST /api/auth/register
/// Creates an account and sends a welcome email in the background
///
/// # Request Body
/// ```json
/// { "name": "Jane", "email": "jane@example.com", "password": "secret123" }
/// ```
///
/// # Response (201)
/// ```json
/// { "data": { "id": 1, "name": "Jane", "email": "jane@example.com", ... } }
/// ```
pub async fn register(
    Extension(state): Extension<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload?;

    let validation = RegisterValidator.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let user = state
        .auth_service
        .register(request.name.trim(), &request.email, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "data": user }))))
}

/// POST /api/auth/login
///
/// # Response
/// ```json
/// { "token": "<jwt token>", "user": { ... } }
/// ```
pub async fn login(
    Extension(state): Extension<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResult>, ApiError> {
    let Json(request) = payload?;

    let validation = LoginValidator.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    let result = state
        .auth_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(result))
}

/// POST /api/auth/forgot-password
///
/// Always answers with the same message once the body is well formed, so
/// the response never reveals whether the address has an account.
pub async fn forgot_password(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let validation = ForgotPasswordValidator.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    if let Err(e) = state.auth_service.forgot_password(&request.email).await {
        error!(
            error = %e,
            email = %safe_email_log(&request.email),
            "Forgot password failed internally"
        );
    }

    Ok(Json(json!({ "message": FORGOT_PASSWORD_MESSAGE })))
}

/// POST /api/auth/reset-password
///
/// # Request Body
/// ```json
/// { "token": "<reset token>", "password": "newpass", "confirm_password": "newpass" }
/// ```
pub async fn reset_password(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;

    let validation = ResetPasswordValidator.validate(&request);
    if !validation.is_valid {
        return Err(ApiError::from(validation));
    }

    state
        .auth_service
        .reset_password(request.token.trim(), &request.password)
        .await?;

    Ok(Json(json!({ "message": RESET_PASSWORD_MESSAGE })))
}

/// GET /api/auth/me
/// Returns the current authenticated user's information
pub async fn me_handler(
    Extension(state): Extension<AppState>,
    authed: AuthedUser,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .user_service
        .get_profile(authed.id)
        .await
        .map_err(|e| {
            if matches!(e, UserServiceError::UserNotFound) {
                warn!(
                    user_id = authed.id,
                    email = %safe_email_log(&authed.email),
                    "Token belongs to a user that no longer exists"
                );
            }
            ApiError::from(e)
        })?;

    Ok(Json(json!({ "data": user })))
}
