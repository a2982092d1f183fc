//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; anything convertible into `AppError`
//! renders through the same status, body and logging path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quickdrop_core::{AppError, ErrorMetadata, LogLevel};
use quickdrop_services::IngestError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable reason
    pub message: String,
    /// Error detail for server-side failures; omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
            code: code.into(),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from quickdrop-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn body(&self, is_production: bool) -> ErrorResponse {
        let app_error = &self.0;
        let mut body = ErrorResponse::new(app_error.client_message(), app_error.error_code());

        // Only server-side failures carry detail, and never in production
        if app_error.http_status_code() >= 500 && !is_production {
            body.error = Some(app_error.detailed_message());
        }

        body
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        (status, Json(self.body(is_production_env()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_carry_no_detail() {
        let err = HttpAppError(AppError::NoFileProvided);
        let body = err.body(false);
        assert!(!body.success);
        assert_eq!(body.message, "No file uploaded");
        assert_eq!(body.code, "NO_FILE_PROVIDED");
        assert!(body.error.is_none());
    }

    #[test]
    fn server_errors_hide_detail_in_production() {
        let err = HttpAppError(AppError::StorageWriteFailed("disk full".into()));

        let dev = err.body(false);
        assert_eq!(dev.message, "Failed to store uploaded file");
        assert!(dev.error.as_deref().is_some_and(|e| e.contains("disk full")));

        let prod = err.body(true);
        assert!(prod.error.is_none());
        assert_eq!(prod.code, "STORAGE_WRITE_FAILED");
    }

    #[test]
    fn error_field_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(ErrorResponse::new("nope", "NOT_FOUND")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "message": "nope", "code": "NOT_FOUND" })
        );
    }
}
