//! Event ingestion and search endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use engine_core::{limits::MAX_DURABLE_LIST_LIMIT, EventQuery};
use serde::Deserialize;
use tracing::debug;

use crate::extractors::ValidatedEvent;
use crate::response::{ApiError, DurableEventsResponse, EventsResponse, StatusResponse};
use crate::state::AppState;

/// POST /events - Ingests one event.
///
/// Returns only after the durable commit and the analytics write both
/// succeeded. Enrichment is scheduled, never awaited. The run is detached
/// from the connection, so a client hanging up mid-retry does not stop it.
pub async fn ingest_handler(
    State(state): State<AppState>,
    ValidatedEvent(event): ValidatedEvent,
) -> Result<Json<StatusResponse>, ApiError> {
    let receipt = state.coordinator.ingest_detached(event).await?;

    debug!(
        durable_id = %receipt.durable_id,
        analytics_id = %receipt.analytics_id,
        "Ingest request served"
    );

    Ok(Json(StatusResponse::accepted()))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub severity: Option<String>,
}

impl SearchParams {
    /// An empty `severity` means no filter.
    fn into_query(self) -> EventQuery {
        match self.severity {
            Some(severity) if !severity.is_empty() => EventQuery::severity(severity),
            _ => EventQuery::all(),
        }
    }
}

/// GET /events - Up to 10 analytics documents, optionally by severity.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<EventsResponse>, ApiError> {
    let docs = state.queries.search(&params.into_query()).await?;
    Ok(Json(docs.into()))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

/// GET /mongo/events - Raw durable store listing.
pub async fn durable_list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<DurableEventsResponse>, ApiError> {
    let limit = params
        .limit
        .map(|l| l.clamp(1, i64::from(MAX_DURABLE_LIST_LIMIT)) as u32);

    let records = state.queries.list_durable(limit).await?;
    Ok(Json(records.into()))
}
