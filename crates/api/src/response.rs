//! API responses and the error-to-response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use engine_core::{AnalyticsDocument, DurableRecord};
use serde::{Deserialize, Serialize};
use telemetry::{HealthReport, MetricsSnapshot};
use tracing::warn;

/// `{"status": "..."}` body used by ingestion and `/ping`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn accepted() -> Self {
        Self {
            status: "accepted".to_string(),
        }
    }

    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Analytics search results.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    pub count: usize,
    pub events: Vec<AnalyticsDocument>,
}

impl From<Vec<AnalyticsDocument>> for EventsResponse {
    fn from(events: Vec<AnalyticsDocument>) -> Self {
        Self {
            count: events.len(),
            events,
        }
    }
}

/// Raw durable store listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct DurableEventsResponse {
    pub count: usize,
    pub events: Vec<DurableRecord>,
}

impl From<Vec<DurableRecord>> for DurableEventsResponse {
    fn from(events: Vec<DurableRecord>) -> Self {
        Self {
            count: events.len(),
            events,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub mongo_connected: bool,
    pub clickhouse_connected: bool,
    pub report: HealthReport,
    pub metrics: MetricsSnapshot,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// API error: a status plus a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse {
                detail: detail.into(),
                errors: None,
            },
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            response: ErrorResponse {
                detail: "Validation failed".to_string(),
                errors: Some(errors),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<engine_core::Error> for ApiError {
    fn from(err: engine_core::Error) -> Self {
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %err, "Request failed");
        }
        ApiError::new(status, err.detail())
    }
}
