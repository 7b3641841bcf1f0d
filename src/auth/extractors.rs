//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};

use crate::common::{ApiError, AppState};

/// Authenticated user extractor
///
/// Requires `Authorization: Bearer <jwt>` and verifies the token's signature,
/// algorithm, issuer and expiry. The token is trusted on its own; the user
/// record is not re-read.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: i64,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<AppState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let header = match parts.headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
            Some(h) => h,
            None => {
                warn!("Authentication failed: missing Authorization header");
                return Err(ApiError::Unauthorized("Authorization header missing".into()));
            }
        };

        let token = match header.strip_prefix("Bearer ").map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => {
                warn!("Authentication failed: Authorization header is not a bearer token");
                return Err(ApiError::Unauthorized("Invalid token format".into()));
            }
        };

        let claims = app_state.jwt.verify(token).map_err(|e| {
            warn!(error = %e, "JWT token validation failed");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        debug!(user_id = claims.user_id, "User authentication successful via extractor");

        Ok(AuthedUser {
            id: claims.user_id,
            email: claims.email,
        })
    }
}
