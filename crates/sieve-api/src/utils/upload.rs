use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};

use sieve_core::constants::UPLOAD_FIELD_NAME;
use sieve_core::AppError;

/// The `file` field of an upload form, fully buffered.
pub struct ReceivedFile {
    pub declared_name: String,
    pub content: Bytes,
}

fn multipart_error(err: MultipartError, received: usize, max_size: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge {
            size: received.max(max_size + 1),
            max: max_size,
        };
    }
    AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
}

/// Read the single `file` field, stopping with `PayloadTooLarge` as soon as the running
/// total passes `max_size`. Other fields are skipped.
pub async fn read_file_field(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<ReceivedFile, AppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, 0, max_size))?
    {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let declared_name = field.file_name().unwrap_or_default().to_string();
        let mut buffer = BytesMut::new();

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| multipart_error(e, buffer.len(), max_size))?
        {
            let received = buffer.len() + chunk.len();
            if received > max_size {
                return Err(AppError::PayloadTooLarge {
                    size: received,
                    max: max_size,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        return Ok(ReceivedFile {
            declared_name,
            content: buffer.freeze(),
        });
    }

    Err(AppError::InvalidInput(format!(
        "No file provided; send exactly one field named '{}'",
        UPLOAD_FIELD_NAME
    )))
}
