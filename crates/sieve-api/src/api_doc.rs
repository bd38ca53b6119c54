//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;
use sieve_core::models;
use sieve_infra::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sieve API",
        version = "0.1.0",
        description = "Asynchronous file upload ingestion. Uploads are checked synchronously for size, rate limit and executable content, then classified and stored by a background worker. Poll /status/{id} until a terminal state (Completed, Failed, VirusDetected)."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::status::get_status,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::StatusResponse,
            models::UploadStatus,
            handlers::health::HealthResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "uploads", description = "Upload ingestion and status polling"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/upload", "/status/{id}", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
