pub mod files;
pub mod health;
pub mod upload;

use crate::error::HttpAppError;
use quickdrop_core::AppError;

/// Fallback for unknown routes, including the bare upload directory
pub async fn not_found() -> HttpAppError {
    HttpAppError(AppError::NotFound("Not found".to_string()))
}
