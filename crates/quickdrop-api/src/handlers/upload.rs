use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use quickdrop_core::{constants::UPLOAD_FIELD_NAME, StoredFile};
use quickdrop_services::UploadCandidate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::UPLOAD_SUCCESS_MESSAGE;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::multipart::{field_to_candidate, multipart_error};

/// Descriptor of the accepted file
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadedFile {
    /// Stored name, unique within the storage root
    pub filename: String,
    /// Filename as sent by the client
    pub originalname: String,
    pub mimetype: String,
    /// Size in bytes
    pub size: u64,
    /// Location of the file under the upload directory
    pub path: String,
    /// URL path the file is served from
    pub url: String,
    /// Media family ("image" or "video")
    #[serde(rename = "type")]
    pub file_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub file: UploadedFile,
}

impl UploadResponse {
    fn accepted(stored: StoredFile, state: &AppState) -> Self {
        let path = state
            .config
            .upload
            .storage_root
            .join(&stored.relative_path)
            .to_string_lossy()
            .into_owned();
        let url = state.storage.url_for(&stored.stored_name);
        let file_type = stored.type_tag().to_string();

        Self {
            success: true,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            file: UploadedFile {
                filename: stored.stored_name,
                originalname: stored.original_name,
                mimetype: stored.mime_type,
                size: stored.size_bytes,
                path,
                url,
                file_type,
            },
        }
    }
}

/// Upload a single image or video
///
/// The first multipart file part named `file` is streamed straight to storage;
/// other parts, including text fields named `file`, are ignored.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "No file or unsupported file type", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let max_file_size = state.config.upload.max_file_size_bytes;

    // A body that is not multipart at all carries no file
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Request is not multipart");
            return accept(&state, None).await;
        }
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        // Plain text fields carry no filename and are not files
        if field.name() != Some(UPLOAD_FIELD_NAME) || field.file_name().is_none() {
            continue;
        }
        return accept(&state, Some(field_to_candidate(field))).await;
    }

    // No part named `file`
    accept(&state, None).await
}

async fn accept(
    state: &AppState,
    candidate: Option<UploadCandidate<'_>>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let stored = state.ingest.ingest(candidate).await?;
    Ok(Json(UploadResponse::accepted(stored, state)))
}
