// src/common/config.rs
//! Application configuration, read once from the environment at startup
//! and shared read-only afterwards.

use std::env;
use tracing::warn;

const DEFAULT_DATABASE_URL: &str = "sqlite://auth_api.db";
const DEFAULT_JWT_SECRET: &str = "replace_with_strong_secret";
const DEFAULT_JWT_EXPIRED_IN: &str = "24h";
const DEFAULT_JWT_ISSUER: &str = "auth-api";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Human-readable lifetime such as `24h` or `1h 30m`
    pub expired_in: String,
    pub issuer: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// `None` when `SMTP_HOST` is unset; emails are then only logged
    pub smtp: Option<SmtpConfig>,
    /// Base URL of the frontend that hosts the reset-password page
    pub frontend_url: String,
    pub cors_origins: Vec<String>,
    pub port: u16,
    pub reset_db: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests can supply a map.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using the insecure development default");
            DEFAULT_JWT_SECRET.to_string()
        });

        let smtp = get("SMTP_HOST").map(|host| SmtpConfig {
            host,
            port: get("SMTP_PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            email: get("SMTP_EMAIL").unwrap_or_default(),
            password: get("SMTP_PASSWORD").unwrap_or_default(),
        });

        let frontend_url = get("FRONTEND_URL")
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt: JwtConfig {
                secret: jwt_secret,
                expired_in: get("JWT_EXPIRED_IN")
                    .unwrap_or_else(|| DEFAULT_JWT_EXPIRED_IN.to_string()),
                issuer: get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            },
            smtp,
            frontend_url,
            cors_origins,
            port: get("PORT")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            reset_db: get("RESET_DB")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]);

        assert_eq!(config.database_url, "sqlite://auth_api.db");
        assert_eq!(config.jwt.secret, "replace_with_strong_secret");
        assert_eq!(config.jwt.expired_in, "24h");
        assert_eq!(config.jwt.issuer, "auth-api");
        assert!(config.smtp.is_none());
        assert_eq!(config.frontend_url, "http://localhost:5173");
        assert_eq!(config.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(config.port, 8080);
        assert!(!config.reset_db);
    }

    #[test]
    fn test_values_are_read_from_lookup() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_EXPIRED_IN", "2h"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_EMAIL", "noreply@example.com"),
            ("SMTP_PASSWORD", "pw"),
            ("FRONTEND_URL", "https://app.example.com/"),
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com,"),
            ("PORT", "3000"),
            ("RESET_DB", "TRUE"),
        ]);

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.jwt.secret, "s3cret");
        assert_eq!(config.jwt.expired_in, "2h");

        let smtp = config.smtp.expect("smtp should be configured");
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.email, "noreply@example.com");

        assert_eq!(config.frontend_url, "https://app.example.com");
        assert_eq!(
            config.cors_origins,
            vec![
                "https://a.example.com".to_string(),
                "https://b.example.com".to_string()
            ]
        );
        assert_eq!(config.port, 3000);
        assert!(config.reset_db);
    }

    #[test]
    fn test_unparsable_numbers_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "eighty"), ("SMTP_HOST", "mx"), ("SMTP_PORT", "x")]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.smtp.map(|s| s.port), Some(587));
    }
}
