//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`; any `AppError` converts with `?` and renders
//! as an [`ErrorResponse`] body with the variant's status code. Internal details are only
//! shown to clients outside production, decided by [`expose_error_details`] from config.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sieve_core::{AppError, ErrorMetadata, LogLevel};
use sieve_infra::ErrorResponse;
use std::sync::Arc;

use crate::state::AppState;

/// Error body including details, attached to the response for non-sensitive errors.
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub ErrorResponse);

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: `IntoResponse` and `AppError` are both foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request rejected");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Request failed"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse {
            error: app_error.client_message(),
            details: None,
            error_type: None,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };
        let detailed = (!app_error.is_sensitive()).then(|| ErrorResponse {
            details: Some(app_error.detailed_message()),
            error_type: Some(app_error.error_type().to_string()),
            ..body.clone()
        });

        let mut response = (status, Json(body)).into_response();

        if let Some(detailed) = detailed {
            response.extensions_mut().insert(ErrorDetails(detailed));
        }

        if let Some(secs) = app_error.retry_after_secs() {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Swap in the detailed error body outside production.
pub async fn expose_error_details(
    State(state): State<Arc<AppState>>,
    mut response: Response,
) -> Response {
    let Some(ErrorDetails(detailed)) = response.extensions_mut().remove::<ErrorDetails>() else {
        return response;
    };
    if state.config.is_production() {
        return response;
    }

    let (parts, _) = response.into_parts();
    Response::from_parts(parts, Json(detailed).into_response().into_body())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response = HttpAppError(AppError::RateLimited {
            retry_after_secs: 17,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "17");
    }

    #[test]
    fn test_validation_errors_have_no_retry_after() {
        let response = HttpAppError(AppError::ExecutableRejected).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());
    }

    #[test]
    fn test_details_kept_out_of_body_and_attached_for_non_sensitive_errors() {
        let response = HttpAppError(AppError::ExecutableRejected).into_response();

        let ErrorDetails(detailed) = response
            .extensions()
            .get::<ErrorDetails>()
            .cloned()
            .expect("non-sensitive errors carry details");
        assert!(detailed.details.is_some());
        assert_eq!(detailed.code, "EXECUTABLE_REJECTED");
    }

    #[test]
    fn test_sensitive_errors_carry_no_details() {
        let response = HttpAppError(AppError::Internal("disk on fire".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ErrorDetails>().is_none());
    }

    #[test]
    fn test_queue_full_is_service_unavailable() {
        let response = HttpAppError(AppError::QueueFull).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(header::RETRY_AFTER).is_some());
    }
}
