use std::any::Any;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use roster_core::DomainError;
use roster_infra::StorageError;

/// Map a storage failure to a response.
///
/// Not-found is echoed verbatim. Timeouts and backend faults are logged with
/// full detail and answered with a generic message.
pub fn storage_error_to_response(err: StorageError) -> axum::response::Response {
    match err {
        StorageError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", err.to_string()),
        StorageError::Timeout { .. } => {
            tracing::error!(error = %err, "storage call timed out");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage_timeout",
                "storage operation timed out",
            )
        }
        StorageError::Backend(_) | StorageError::Codec { .. } => {
            tracing::error!(error = %err, "storage call failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", "storage error")
        }
    }
}

pub fn invalid_id(err: DomainError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string())
}

/// A path segment the router could not hand over as text (e.g. it
/// percent-decodes to invalid UTF-8).
pub fn invalid_path(rejection: PathRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", rejection.body_text())
}

/// Any body the JSON extractor refuses (syntax, missing field, wrong type,
/// wrong content type) is a 400.
pub fn invalid_body(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

/// Response for a handler that panicked. The panic payload is logged, never
/// returned.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
