//! Shared constants

/// MIME types accepted when `ALLOWED_CONTENT_TYPES` is not set
pub const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
];

/// Multipart field carrying the uploaded file
pub const UPLOAD_FIELD_NAME: &str = "file";
