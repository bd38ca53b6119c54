//! Route configuration and setup

use axum::{
    extract::DefaultBodyLimit, middleware::map_response_with_state, routing::get, routing::post,
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use sieve_core::Config;

use crate::api_doc::ApiDoc;
use crate::error::expose_error_details;
use crate::handlers;
use crate::state::AppState;

/// Headroom above the file size limit for multipart boundaries and part headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let body_limit = config
        .max_upload_size_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/upload", post(handlers::upload::upload_file))
        .route("/status/{id}", get(handlers::status::get_status))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(map_response_with_state(state.clone(), expose_error_details))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
