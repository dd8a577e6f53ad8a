use axum::{routing::get, Router};

use crate::handlers;
use crate::AppState;

/// Build the retrieval routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/file/*path", get(handlers::get_file))
        .route("/stream/*path", get(handlers::stream_file))
}
