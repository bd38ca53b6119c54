use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub queue_capacity: usize,
    pub queue_depth: usize,
    pub tracked_uploads: usize,
    pub tracked_clients: usize,
}

/// Liveness plus a snapshot of queue and store sizes.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let status = if state.queue.is_closed() {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        queue_capacity: state.queue.capacity(),
        queue_depth: state.queue.depth(),
        tracked_uploads: state.status_store.len(),
        tracked_clients: state.rate_limiter.tracked_clients(),
    })
}
