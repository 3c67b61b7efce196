use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::SessionUser;
use crate::state::AppState;
use crate::storage::ContentHash;

/// Download an uploaded file by its content hash. Any logged-in user.
#[utoipa::path(
    get,
    path = "/api/v1/files/{hash}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download an uploaded file",
    description = "Streams the file stored under the given content hash. Supports ETag-based \
        caching via If-None-Match; content hashes make the ETag exact.",
    params(("hash" = String, Path, description = "64-char hex content hash")),
    responses(
        (status = 200, description = "File content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 401, description = "No valid session (SESSION_MISSING, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _session_user, headers), fields(hash))]
pub async fn download_file(
    _session_user: SessionUser,
    State(state): State<AppState>,
    Path(hash): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let hash = ContentHash::from_hex(&hash)
        .map_err(|_| AppError::Validation("Invalid file hash".into()))?;

    let etag_value = format!("\"{}\"", hash.to_hex());
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let size = state.blob_store.size(&hash).await?;
    let reader = state.blob_store.get_stream(&hash).await?;
    let stream = ReaderStream::new(reader);
    let body = Body::from_stream(stream);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}
