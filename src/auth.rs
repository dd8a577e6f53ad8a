//! Bearer-token authentication gate.
//!
//! Built once at startup from the optional signing secret. With no secret
//! configured the gate admits every request without inspecting a token; a
//! deployment running that way has no authentication at all, which is logged
//! loudly at startup.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::error_response;

/// Claims carried by an accepted token.
///
/// Only validity matters downstream; no role- or claim-based authorization is
/// performed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Authentication errors. Every variant maps to a 401.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingAuthHeader,

    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let error_code = match &self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidToken => "invalid_token",
        };
        error_response(StatusCode::UNAUTHORIZED, error_code, &self.to_string())
    }
}

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Token gate shared across handlers.
#[derive(Clone)]
pub struct AuthGate {
    decoding_key: Option<DecodingKey>,
}

impl AuthGate {
    /// Create the gate from the optional signing secret. Empty or absent
    /// secrets disable authentication.
    pub fn new(secret: Option<&str>) -> Self {
        let decoding_key = secret
            .filter(|s| !s.is_empty())
            .map(|s| DecodingKey::from_secret(s.as_bytes()));
        Self { decoding_key }
    }

    pub fn enabled(&self) -> bool {
        self.decoding_key.is_some()
    }

    /// Admit or reject a request given the raw `Authorization` header value.
    ///
    /// Disabled mode admits unconditionally and returns no claims. Enabled
    /// mode requires a well-formed bearer header carrying an HS256 token with
    /// a valid signature and an unexpired `exp` claim.
    pub fn authorize(&self, auth_header: Option<&str>) -> Result<Option<Claims>, AuthError> {
        let Some(decoding_key) = &self.decoding_key else {
            return Ok(None);
        };

        let header = auth_header.ok_or(AuthError::MissingAuthHeader)?;
        let token = bearer_token_from_header(header)?;
        validate_token(token, decoding_key).map(Some)
    }
}

/// Validate a token against the signing key. HS256 is the only accepted
/// algorithm; a token declaring anything else fails signature verification.
fn validate_token(token: &str, key: &DecodingKey) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, key, &validation).map_err(|e| {
        warn!("token validation failed: {:?}", e.kind());
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    })?;

    Ok(token_data.claims)
}
