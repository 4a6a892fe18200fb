use crate::api::middleware::metrics;
use crate::models::common::SuccessResponse;
use axum::{Json, response::IntoResponse};

#[utoipa::path(
    get,
    path = "/api/v1/ping",
    responses(
        (status = 200, description = "Service answers", body = SuccessResponse)
    ),
    tag = "system"
)]
pub async fn ping() -> impl IntoResponse {
    Json(SuccessResponse {
        message: "pong".to_string(),
    })
}

/// Prometheus text exposition scrape endpoint.
pub async fn scrape_metrics() -> impl IntoResponse {
    (
        [("content-type", "text/plain; version=0.0.4")],
        metrics::render(),
    )
}
