//! Serves stored files by name.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use quickdrop_core::{validation, AppError};
use quickdrop_storage::{keys, StorageError};
use std::sync::Arc;

/// Download a stored file
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    tag = "uploads",
    params(
        ("name" = String, Path, description = "Stored name returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "Raw file content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_upload"))]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, HttpAppError> {
    // Reject anything we could not have stored before touching the filesystem
    if !keys::is_valid_stored_name(&name) {
        return Err(not_found());
    }

    let (size, stream) = state
        .storage
        .download_stream(&name)
        .await
        .map_err(|e| match e {
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => not_found(),
            other => {
                tracing::error!(error = %other, file = %name, "Failed to retrieve file from storage");
                HttpAppError::from(AppError::Internal(other.to_string()))
            }
        })?;

    let content_type = keys::stored_extension(&name)
        .map(validation::content_type_for_extension)
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        )
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}

fn not_found() -> HttpAppError {
    HttpAppError(AppError::NotFound("File not found".to_string()))
}
