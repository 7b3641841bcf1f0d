//! User profile and listing handlers

use axum::extract::{rejection::QueryRejection, Extension, Json, Query};
use serde_json::{json, Value};

use super::models::{ListUsersQuery, UsersPage};
use super::services::UserServiceError;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};
use crate::repositories::RepositoryError;

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::UserNotFound => ApiError::NotFound(err.to_string()),
            UserServiceError::Repository(RepositoryError::Database(e)) => ApiError::DatabaseError(e),
            UserServiceError::Repository(other) => ApiError::InternalServer(other.to_string()),
        }
    }
}

/// GET /api/users/profile
pub async fn get_profile(
    Extension(state): Extension<AppState>,
    authed: AuthedUser,
) -> Result<Json<Value>, ApiError> {
    let user = state.user_service.get_profile(authed.id).await?;
    Ok(Json(json!({ "data": user })))
}

/// GET /api/users?page=1&limit=10&search=adm
///
/// `search` is a prefix match on name or email.
///
/// # Response
/// ```json
/// { "users": [ ... ], "total": 25, "page": 1, "limit": 10 }
/// ```
pub async fn get_all_users(
    Extension(state): Extension<AppState>,
    _authed: AuthedUser,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<UsersPage>, ApiError> {
    let Query(query) = query?;

    let page = state
        .user_service
        .get_all_users(query.page, query.limit, query.search.as_deref())
        .await?;

    Ok(Json(page))
}
