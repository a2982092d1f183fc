//! Upload validation rules
//!
//! MIME allow-list checks and the client-facing rejection messages.

use crate::AppError;

/// Normalize MIME type by stripping parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Whether a normalized MIME type is on the allowlist. Parameters never bypass the check.
pub fn is_content_type_allowed(normalized: &str, allowed_types: &[String]) -> bool {
    !normalized.is_empty() && allowed_types.iter().any(|ct| ct.eq_ignore_ascii_case(normalized))
}

/// Error returned for a MIME type outside the allowlist
pub fn unsupported_type(allowed_types: &[String]) -> AppError {
    AppError::UnsupportedType(format!(
        "Invalid file type. Only {} are allowed",
        allowed_types.join(", ")
    ))
}

/// Error returned whenever an upload crosses `max_size`
pub fn payload_too_large(max_size: u64) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File size exceeds maximum allowed size of {}",
        format_size(max_size)
    ))
}

fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// First segment of a MIME type ("image/png" -> "image").
pub fn type_tag(mime_type: &str) -> &str {
    mime_type.split('/').next().unwrap_or(mime_type).trim()
}

/// Content-Type to serve a stored file with, derived from its extension.
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" | "m4v" => "video/mp4",
        "mpeg" | "mpg" | "mpe" => "video/mpeg",
        "mov" | "qt" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        crate::UploadConfig::default().allowed_content_types
    }

    #[test]
    fn content_type_parameters_and_case_are_ignored() {
        let normalized = normalize_mime_type("Image/PNG; charset=binary");
        assert_eq!(normalized, "image/png");
        assert!(is_content_type_allowed(&normalized, &allowed()));
        assert!(is_content_type_allowed("video/quicktime", &allowed()));
    }

    #[test]
    fn disallowed_content_types_rejected() {
        for ct in ["application/pdf", "image/svg+xml", "text/html", "", "image"] {
            assert!(!is_content_type_allowed(&normalize_mime_type(ct), &allowed()));
        }
        match unsupported_type(&allowed()) {
            AppError::UnsupportedType(msg) => assert!(msg.contains("image/jpeg")),
            other => panic!("expected UnsupportedType, got {:?}", other),
        }
    }

    #[test]
    fn payload_too_large_names_the_limit() {
        match payload_too_large(10 * 1024 * 1024) {
            AppError::PayloadTooLarge(msg) => {
                assert_eq!(msg, "File size exceeds maximum allowed size of 10 MB")
            }
            other => panic!("expected PayloadTooLarge, got {:?}", other),
        }
        match payload_too_large(1500) {
            AppError::PayloadTooLarge(msg) => assert!(msg.ends_with("1500 bytes")),
            other => panic!("expected PayloadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn type_tag_takes_first_segment() {
        assert_eq!(type_tag("image/png"), "image");
        assert_eq!(type_tag("video/quicktime"), "video");
    }

    #[test]
    fn served_content_type_follows_extension() {
        assert_eq!(content_type_for_extension("PNG"), "image/png");
        assert_eq!(content_type_for_extension("mov"), "video/quicktime");
        assert_eq!(content_type_for_extension("exe"), "application/octet-stream");
    }
}
