//! Liveness and health endpoints.

use axum::{http::StatusCode, Json};
use telemetry::{health, metrics};

use crate::response::{HealthResponse, StatusResponse};

/// GET /ping - Always ok; touches neither store.
pub async fn ping_handler() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

/// GET /health - Store health as last probed, plus pipeline counters.
pub async fn health_handler() -> Json<HealthResponse> {
    let report = health().report();

    Json(HealthResponse {
        status: format!("{:?}", report.status).to_lowercase(),
        mongo_connected: health().mongo.is_healthy(),
        clickhouse_connected: health().clickhouse.is_healthy(),
        report,
        metrics: metrics().snapshot(),
    })
}

/// GET /health/ready - Readiness probe (both stores reachable).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
