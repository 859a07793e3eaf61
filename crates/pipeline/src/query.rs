//! Read side: analytics search and the raw durable listing.
//!
//! Searches only ever hit the analytics store, so they reflect exactly what
//! the indexer managed to write. Events rejected at indexing are absent
//! from search results even though they are durably stored.

use std::sync::Arc;

use engine_core::{
    limits::{DEFAULT_DURABLE_LIST_LIMIT, MAX_DURABLE_LIST_LIMIT, PAGE_SIZE},
    AnalyticsDocument, AnalyticsStore, DurableRecord, DurableStore, Error, EventQuery, Result,
};
use telemetry::metrics;
use tracing::{debug, error};

/// Read access to both stores.
#[derive(Clone)]
pub struct QueryGateway {
    durable: Arc<dyn DurableStore>,
    analytics: Arc<dyn AnalyticsStore>,
}

impl QueryGateway {
    pub fn new(durable: Arc<dyn DurableStore>, analytics: Arc<dyn AnalyticsStore>) -> Self {
        Self { durable, analytics }
    }

    /// Up to [`PAGE_SIZE`] analytics documents, filtered by exact severity
    /// when one is given.
    pub async fn search(&self, query: &EventQuery) -> Result<Vec<AnalyticsDocument>> {
        metrics().queries.inc();

        let docs = self
            .analytics
            .search(query, PAGE_SIZE)
            .await
            .map_err(|e| {
                metrics().query_errors.inc();
                error!(severity = ?query.severity, error = %e, "Analytics query failed");
                Error::from_query(e)
            })?;

        debug!(severity = ?query.severity, count = docs.len(), "Analytics query served");
        Ok(docs)
    }

    /// Raw records from the durable store. `limit` defaults to 5 and is
    /// clamped to `1..=100`.
    pub async fn list_durable(&self, limit: Option<u32>) -> Result<Vec<DurableRecord>> {
        let limit = limit
            .unwrap_or(DEFAULT_DURABLE_LIST_LIMIT)
            .clamp(1, MAX_DURABLE_LIST_LIMIT);

        self.durable.list(limit).await.map_err(|e| {
            error!(limit, error = %e, "Durable listing failed");
            Error::DurableQuery(e)
        })
    }
}
