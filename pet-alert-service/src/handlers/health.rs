use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::get_metrics;
use crate::startup::AppState;

/// Liveness check; reports the document store connectivity.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.directory.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "pet-alert-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "pet-alert-service",
                "error": e.to_string()
            })),
        ),
    }
}

/// Ready once the document store answers. The push gateway is only reached
/// per alert, so it does not gate readiness.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.directory.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!("Readiness check failed on document store: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
