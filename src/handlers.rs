use std::path::Path;

use axum::{
    body::Body,
    extract::{Path as UrlPath, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::Error;
use crate::AppState;

/// Chunk size for streaming responses.
pub const CHUNK_SIZE: usize = 1024 * 1024;

// ============================================================================
// Path guard
// ============================================================================

/// Resolve a client-supplied relative path against the storage root and open
/// the file it names.
///
/// The candidate is canonicalized before any check, so `..` segments and
/// symlinks cannot escape the root. Metadata is taken on the open handle and
/// the same handle is handed back for reading, so the file that was checked is
/// the file that gets served.
///
/// Every rejection is `NotFound`: responses never distinguish "outside root"
/// from "does not exist".
async fn resolve_file(root: &Path, requested: &str) -> Result<(fs::File, u64), Error> {
    if requested.is_empty() {
        return Err(Error::NotFound);
    }

    let candidate = root.join(requested.trim_start_matches('/'));

    // Fails for nonexistent paths and for names carrying NUL bytes, which
    // collapses those cases into the same rejection as an escape attempt.
    let canonical = fs::canonicalize(&candidate)
        .await
        .map_err(|_| Error::NotFound)?;

    // Component-wise prefix check, so `/data` never matches `/database`. The
    // root itself is excluded; it is a directory, not a servable file.
    if canonical.as_path() == root || !canonical.starts_with(root) {
        debug!("rejected path resolving outside root: {requested:?}");
        return Err(Error::NotFound);
    }

    let file = fs::File::open(&canonical).await.map_err(|_| Error::NotFound)?;
    let metadata = file.metadata().await.map_err(|_| Error::NotFound)?;
    if !metadata.is_file() {
        return Err(Error::NotFound);
    }

    Ok((file, metadata.len()))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /file/{path} - whole-file retrieval.
///
/// No token check here, unlike the streaming endpoint: direct downloads are
/// served to anyone who can reach the gateway.
pub async fn get_file(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
) -> Result<Response, Error> {
    let (mut file, len) = resolve_file(&state.root_dir, &path).await?;

    debug!("serving file: {} ({} bytes)", path, len);

    let mut contents = Vec::with_capacity(len as usize);
    file.read_to_end(&mut contents).await?;

    let mime = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    let file_name = Path::new(&path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let safe_filename = file_name.replace('"', "'");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, contents.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", safe_filename),
            ),
        ],
        contents,
    )
        .into_response())
}

/// GET /stream/{path} - chunked retrieval.
///
/// The auth gate runs before any filesystem access, so a rejected token never
/// learns whether a path exists. The body is produced as 1 MiB chunks read
/// from the open handle; a client disconnect drops the stream, and the handle
/// with it.
pub async fn stream_file(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    state.auth.authorize(auth_header)?;

    let (file, len) = resolve_file(&state.root_dir, &path).await?;

    debug!("streaming file: {} ({} bytes)", path, len);

    let stream = ReaderStream::with_capacity(file, CHUNK_SIZE);
    let body = Body::from_stream(stream);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        body,
    )
        .into_response())
}
