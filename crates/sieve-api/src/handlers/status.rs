use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use sieve_core::models::StatusResponse;
use sieve_core::AppError;
use sieve_infra::ErrorResponse;

use crate::error::HttpAppError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/status/{id}",
    tag = "uploads",
    params(
        ("id" = String, Path, description = "Processing id returned by POST /upload")
    ),
    responses(
        (status = 200, description = "Current processing state", body = StatusResponse),
        (status = 404, description = "Unknown processing id", body = ErrorResponse)
    )
)]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, HttpAppError> {
    // Unparseable ids can never have been issued, so they are simply unknown.
    let entry = Uuid::parse_str(id.trim())
        .ok()
        .and_then(|id| state.status_store.entry(&id))
        .ok_or_else(|| AppError::NotFound(format!("Upload '{}' not found", id)))?;

    Ok(Json(StatusResponse {
        status: entry.status,
        updated_at: entry.updated_at,
    }))
}
