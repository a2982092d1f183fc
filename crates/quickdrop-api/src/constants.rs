//! API constants

use std::time::Duration;

/// Path the OpenAPI document is served at
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Path the interactive API docs are served at
pub const DOCS_PATH: &str = "/docs";

/// Room left in the request body limit for multipart boundaries and part headers
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Upper bound on a single health probe
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Message returned with every accepted upload
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// Fallback client filename when the part carries none
pub const UNKNOWN_FILENAME: &str = "unknown";
