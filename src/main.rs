// src/main.rs
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod app;
mod auth;
mod common;
mod logging_middleware;
mod repositories;
mod security_headers;
mod services;
mod users;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::jwt::JwtSigner;
use auth::password::Argon2Hasher;
use auth::services::AuthService;
use common::{AppConfig, AppState};
use repositories::{SqlitePasswordResetRepository, SqliteUserRepository};
use services::{EmailService, LogMailer, Mailer, SmtpMailer};
use users::services::UserService;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    info!(
        port = config.port,
        frontend_url = %config.frontend_url,
        smtp = config.smtp.is_some(),
        "Configuration loaded"
    );

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    // Run database migrations
    common::migrations::run_migrations(&pool, config.reset_db).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let users = Arc::new(SqliteUserRepository::new(pool.clone()));
    let resets = Arc::new(SqlitePasswordResetRepository::new(pool));

    let jwt = Arc::new(JwtSigner::from_config(&config.jwt));
    info!(ttl_minutes = jwt.ttl().num_minutes(), "JwtSigner initialized");

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => match SmtpMailer::new(smtp) {
            Ok(mailer) => {
                info!(host = %smtp.host, port = smtp.port, "SmtpMailer initialized");
                Arc::new(mailer)
            }
            Err(e) => {
                warn!(error = %e, "Invalid SMTP configuration, emails will only be logged");
                Arc::new(LogMailer)
            }
        },
        None => {
            warn!("SMTP_HOST not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let auth_service = Arc::new(AuthService::new(
        users.clone(),
        resets,
        Arc::new(Argon2Hasher::new()),
        jwt.clone(),
        EmailService::new(mailer),
        config.frontend_url.clone(),
    ));
    info!("AuthService initialized");

    let user_service = Arc::new(UserService::new(users));
    info!("UserService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let port = config.port;
    let app_state = AppState {
        config: Arc::new(config),
        jwt,
        auth_service,
        user_service,
    };

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let app = app::build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
