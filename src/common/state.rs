// Application state shared across all modules

use std::sync::Arc;

use super::config::AppConfig;
use crate::auth::jwt::JwtSigner;
use crate::auth::services::AuthService;
use crate::users::services::UserService;

/// Read-only after startup, so it is cloned into handlers without a lock
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: Arc<JwtSigner>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
}
