use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use sieve_core::models::UploadResponse;
use sieve_core::validation::stored_filename;
use sieve_core::{AppError, UploadTask};
use sieve_infra::ErrorResponse;
use sieve_processing::is_executable_signature;
use sieve_worker::EnqueueError;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::read_file_field;
use crate::utils::ClientIp;

/// Whole seconds, rounded up, so clients never retry a moment too early.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

/// Accept an upload for asynchronous processing.
///
/// Synchronous checks run in order: size, per-client rate limit, executable signature,
/// filename policy. Anything that passes gets a processing id and a `Pending` status;
/// classification and storage happen on the worker.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload accepted for processing", body = UploadResponse),
        (status = 400, description = "Executable content, invalid filename or missing file field", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 429, description = "Upload rate limit exceeded", body = ErrorResponse),
        (status = 503, description = "Upload queue full", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(client_ip = ?client_ip, upload_id))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ClientIp(client_ip): ClientIp,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let config = &state.config;
    let file = read_file_field(multipart, config.max_upload_size_bytes()).await?;

    let ip = client_ip.as_deref();
    if state.rate_limiter.check(ip).await {
        let wait = state.rate_limiter.retry_after(ip).await;
        return Err(AppError::RateLimited {
            retry_after_secs: retry_after_secs(wait),
        }
        .into());
    }

    if is_executable_signature(&file.content) {
        return Err(AppError::ExecutableRejected.into());
    }

    let id = Uuid::new_v4();
    tracing::Span::current().record("upload_id", tracing::field::display(id));

    let sanitized_name = stored_filename(config.filename_policy(), id, &file.declared_name)?;
    let size_bytes = file.content.len();

    let task = UploadTask {
        id,
        content: file.content,
        sanitized_name,
        simulate_scan: config.simulate_antivirus_scan(),
        scan_delay: config.scan_delay(),
        storage_path: config.uploads_dir(),
    };

    // Pending must exist before the worker can pick the task up.
    state.status_store.insert_pending(id);

    if let Err(e) = state.queue.enqueue(task).await {
        state.status_store.remove(&id);
        return Err(match e {
            EnqueueError::Full => AppError::QueueFull,
            EnqueueError::Closed => {
                AppError::ServiceUnavailable("Upload worker is not running".to_string())
            }
        }
        .into());
    }

    tracing::info!(
        declared_name = %file.declared_name,
        size_bytes,
        "Upload accepted"
    );

    Ok(Json(UploadResponse { processing_id: id }))
}
