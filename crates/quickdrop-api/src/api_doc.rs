//! OpenAPI documentation.
//! The file download path is documented under the default public path `/uploads`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quickdrop API",
        version = "0.1.0",
        description = "Single-file image and video upload service. Accepted files are stored under a synthesized name, served back by that name and deleted once they exceed the retention age."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::files::get_upload,
        handlers::health::health_check,
    ),
    components(schemas(
        handlers::upload::UploadResponse,
        handlers::upload::UploadedFile,
        handlers::health::HealthCheckResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "File upload and download"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Returns the OpenAPI document served at `OPENAPI_PATH`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
