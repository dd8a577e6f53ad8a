use axum::http::HeaderValue;
use thiserror::Error;

/// Gateway configuration, fixed at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    /// HS256 signing secret. `None` disables authentication entirely.
    pub jwt_secret: Option<String>,
    /// Origins admitted by the CORS layer.
    pub allowed_origins: AllowedOrigins,
}

/// An origin string that could not be parsed into a header value.
#[derive(Debug, Error)]
#[error("invalid CORS origin: {0:?}")]
pub struct InvalidOrigin(String);

impl Config {
    /// Build the configuration from raw environment values.
    ///
    /// An empty secret is normalized to `None` so the rest of the code has a
    /// single representation for "authentication disabled".
    pub fn new(jwt_secret: String, cors_origins: &str) -> Result<Self, InvalidOrigin> {
        Ok(Self {
            jwt_secret: Some(jwt_secret).filter(|s| !s.is_empty()),
            allowed_origins: AllowedOrigins::parse(cors_origins)?,
        })
    }
}

/// Allowed CORS origins: the wildcard, or an explicit list.
#[derive(Debug, Clone)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl AllowedOrigins {
    /// Parse a `CORS_ORIGINS`-style value: `*` (or empty, the unset default)
    /// means any origin, otherwise a comma-separated origin list.
    pub fn parse(raw: &str) -> Result<Self, InvalidOrigin> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return Ok(Self::Any);
        }

        let mut origins = Vec::new();
        for origin in raw.split(',') {
            let origin = origin.trim();
            if origin.is_empty() {
                continue;
            }
            let value = HeaderValue::from_str(origin)
                .map_err(|_| InvalidOrigin(origin.to_string()))?;
            origins.push(value);
        }

        if origins.is_empty() {
            return Err(InvalidOrigin(raw.to_string()));
        }

        Ok(Self::List(origins))
    }
}
