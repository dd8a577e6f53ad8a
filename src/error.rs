//! Request-level errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

/// Errors surfaced to the client.
#[derive(Debug, Error)]
pub enum Error {
    /// File missing, a directory, or outside the storage root. One uniform
    /// rejection so responses reveal nothing about the directory layout.
    #[error("file not found")]
    NotFound,

    /// Authentication failure on the streaming path.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// I/O failure after the path was already admitted.
    #[error("internal error")]
    Internal(#[from] std::io::Error),
}

/// JSON error body shared by all failure responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

pub(crate) fn error_response(status: StatusCode, error_code: &str, message: &str) -> Response {
    let body = Json(ErrorResponse {
        error: message.to_string(),
        error_code: error_code.to_string(),
    });
    (status, body).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Auth(err) => err.into_response(),
            Error::NotFound => {
                error_response(StatusCode::NOT_FOUND, "not_found", "file not found")
            }
            Error::Internal(err) => {
                error!("request failed: {err}");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error",
                )
            }
        }
    }
}
