// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{debug, enabled, Level};

use crate::common::helpers::redact_sensitive_fields;

/// Bodies larger than this are passed through without being logged
const MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

/// Renders a body for the log with credentials and tokens masked.
/// Non-JSON bodies are logged verbatim only if they are valid UTF-8.
pub fn loggable_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }

    let body_str = std::str::from_utf8(bytes).ok()?;
    match serde_json::from_str::<serde_json::Value>(body_str) {
        Ok(mut json) => {
            redact_sensitive_fields(&mut json);
            Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| "<unprintable>".to_string()))
        }
        // Might be a form post carrying a password; don't echo it
        Err(_) if body_str.contains("password") => Some("<redacted>".to_string()),
        Err(_) => Some(body_str.to_string()),
    }
}

async fn buffer(body: Body) -> Result<Bytes, StatusCode> {
    to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to log request and response bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = buffer(body).await?;

    if bytes.len() <= MAX_LOGGED_BODY_BYTES {
        if let Some(body) = loggable_body(&bytes) {
            debug!(method = %parts.method, uri = %parts.uri, request_body = %body, "📥 Request");
        }
    }

    let response = next.run(Request::from_parts(parts, Body::from(bytes))).await;

    let (parts, body) = response.into_parts();
    let bytes = buffer(body).await?;

    if bytes.len() <= MAX_LOGGED_BODY_BYTES {
        if let Some(body) = loggable_body(&bytes) {
            debug!(status = %parts.status, response_body = %body, "📤 Response");
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
