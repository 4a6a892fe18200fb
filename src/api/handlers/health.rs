use crate::AppState;
use crate::services::health::ProbeResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "All dependencies are healthy", body = crate::services::health::HealthResponse),
        (status = 503, description = "One or more dependencies are unhealthy", body = crate::services::health::HealthResponse)
    ),
    tag = "system"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.health.health().await;
    let status = if report.status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Service is ready to accept traffic", body = ProbeResponse),
        (status = 503, description = "Service is not ready", body = ProbeResponse)
    ),
    tag = "system"
)]
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    if state.health.ready().await {
        (
            StatusCode::OK,
            Json(ProbeResponse {
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: "not ready".to_string(),
            }),
        )
    }
}

#[utoipa::path(
    get,
    path = "/live",
    responses(
        (status = 200, description = "Process is alive", body = ProbeResponse)
    ),
    tag = "system"
)]
pub async fn live() -> impl IntoResponse {
    Json(ProbeResponse {
        status: "alive".to_string(),
    })
}
