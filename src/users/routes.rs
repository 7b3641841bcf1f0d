//! User routes (all require a bearer token)

use axum::{routing::get, Router};

use super::handlers;

/// Creates the users router
///
/// # Routes
/// - `GET /api/users` - Paginated user listing with prefix search
/// - `GET /api/users/profile` - Current user's profile
pub fn users_routes() -> Router {
    Router::new()
        .route("/api/users", get(handlers::get_all_users))
        .route("/api/users/profile", get(handlers::get_profile))
}
