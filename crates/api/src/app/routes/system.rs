use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use roster_infra::Storage;

/// Liveness plus a round trip to the store.
pub async fn health(Extension(storage): Extension<Storage>) -> axum::response::Response {
    match storage.ping().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}
