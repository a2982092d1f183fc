//! Multipart helpers for the upload handler

use std::io;

use axum::extract::multipart::{Field, MultipartError};
use axum::http::{header, StatusCode};
use futures::StreamExt;
use quickdrop_core::{validation, AppError};
use quickdrop_services::{UploadCandidate, UploadLimitExceeded};

use crate::constants::UNKNOWN_FILENAME;

/// Map a multipart framing error to the client-facing error.
pub fn multipart_error(err: MultipartError, max_file_size: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        validation::payload_too_large(max_file_size)
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

fn field_error(err: MultipartError) -> io::Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::Error::other(UploadLimitExceeded)
    } else {
        io::Error::other(err.body_text())
    }
}

/// Wrap a file part as an upload candidate without buffering its content.
pub fn field_to_candidate(field: Field<'_>) -> UploadCandidate<'_> {
    let original_filename = field
        .file_name()
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_FILENAME.to_string());
    let declared_mime_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let size_hint = field
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    UploadCandidate {
        declared_mime_type,
        original_filename,
        size_hint,
        content: field.map(|chunk| chunk.map_err(field_error)).boxed(),
    }
}
