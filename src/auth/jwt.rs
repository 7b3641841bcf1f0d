//! Session token signing and verification (HS256 JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::warn;

use super::models::Claims;
use crate::common::config::JwtConfig;

/// Fallback lifetime when the configured duration cannot be parsed
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Encode(jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Parses a duration such as `24h`, `90m` or `1h 30m`.
/// Anything unparsable, or zero, falls back to 24 hours.
pub fn parse_token_ttl(raw: &str) -> Duration {
    let fallback = Duration::hours(DEFAULT_TOKEN_TTL_HOURS);

    match humantime::parse_duration(raw.trim()) {
        Ok(parsed) if !parsed.is_zero() => Duration::from_std(parsed).unwrap_or_else(|_| {
            warn!(value = %raw, "JWT_EXPIRED_IN out of range, using 24h");
            fallback
        }),
        Ok(_) => {
            warn!(value = %raw, "JWT_EXPIRED_IN is zero, using 24h");
            fallback
        }
        Err(e) => {
            warn!(value = %raw, error = %e, "JWT_EXPIRED_IN is not a valid duration, using 24h");
            fallback
        }
    }
}

/// Issues and verifies stateless session tokens.
///
/// Verification pins HS256, so a token whose header names any other
/// algorithm (including `none`) is rejected. No clock-skew leeway is granted.
#[derive(Clone)]
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl JwtSigner {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            &config.secret,
            config.issuer.clone(),
            parse_token_ttl(&config.expired_in),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Encode)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> JwtSigner {
        JwtSigner::new(secret, "auth-api", Duration::hours(1))
    }

    fn sign_raw(claims: &Claims, algorithm: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to encode token")
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let signer = signer("test_secret_key");
        let token = signer.issue(42, "user@example.com").unwrap();

        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.iss, "auth-api");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_fails_with_wrong_secret() {
        let token = signer("test_secret_key").issue(1, "a@example.com").unwrap();

        let result = signer("wrong_secret_key").verify(&token);
        assert!(result.is_err(), "Token validation should fail with wrong secret");
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            email: "a@example.com".to_string(),
            iat: now - 7200,
            exp: now - 60,
            iss: "auth-api".to_string(),
        };
        let token = sign_raw(&claims, Algorithm::HS256, "test_secret_key");

        assert!(signer("test_secret_key").verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_other_algorithms() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            email: "a@example.com".to_string(),
            iat: now,
            exp: now + 600,
            iss: "auth-api".to_string(),
        };
        let token = sign_raw(&claims, Algorithm::HS512, "test_secret_key");

        assert!(signer("test_secret_key").verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_unsigned_token() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

        let now = Utc::now().timestamp();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"user_id":1,"email":"a@example.com","iat":{},"exp":{},"iss":"auth-api"}}"#,
            now,
            now + 600
        ));
        let token = format!("{}.{}.", header, payload);

        assert!(signer("test_secret_key").verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_foreign_issuer() {
        let other = JwtSigner::new("test_secret_key", "someone-else", Duration::hours(1));
        let token = other.issue(1, "a@example.com").unwrap();

        assert!(signer("test_secret_key").verify(&token).is_err());
    }

    #[test]
    fn test_parse_token_ttl() {
        assert_eq!(parse_token_ttl("24h"), Duration::hours(24));
        assert_eq!(parse_token_ttl("90m"), Duration::minutes(90));
        assert_eq!(parse_token_ttl("1h 30m"), Duration::minutes(90));
        assert_eq!(parse_token_ttl("15s"), Duration::seconds(15));
    }

    #[test]
    fn test_parse_token_ttl_falls_back_to_24_hours() {
        assert_eq!(parse_token_ttl(""), Duration::hours(24));
        assert_eq!(parse_token_ttl("forever"), Duration::hours(24));
        assert_eq!(parse_token_ttl("0s"), Duration::hours(24));
    }

    #[test]
    fn test_from_config_uses_parsed_ttl() {
        let config = JwtConfig {
            secret: "s".to_string(),
            expired_in: "2h".to_string(),
            issuer: "auth-api".to_string(),
        };
        assert_eq!(JwtSigner::from_config(&config).ttl(), Duration::hours(2));
    }
}
