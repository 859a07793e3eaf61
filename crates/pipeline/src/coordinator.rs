//! Ingestion coordinator.
//!
//! ```text
//! Received ──commit──▶ DurablyStored ──index──▶ Indexed ──▶ Accepted
//!    │                      │                                  ┆
//!    ▼                      ▼                                  ┆ (no wait)
//! RejectedAtDurableWrite  RejectedAtIndexing          EnrichmentScheduled
//! ```
//!
//! The durable write always happens before indexing, and indexing before
//! enrichment is scheduled. Once started, a run is not cancelled by the
//! caller going away: [`IngestionCoordinator::ingest_detached`] runs it on
//! its own task. Enrichment runs on its own worker and may finish
//! before or after the caller sees the response. Nothing is rolled back: an
//! event rejected at indexing stays in the durable store.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use engine_core::{AnalyticsId, DurableId, DurableStore, Error, Event, Result};
use telemetry::metrics;
use tracing::{debug, error, info, instrument};
use worker::{EnrichmentJob, EnrichmentQueue};

use crate::indexer::RetryingIndexer;

/// Where an event is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Received,
    DurablyStored,
    Indexed,
    EnrichmentScheduled,
    Accepted,
    RejectedAtDurableWrite,
    RejectedAtIndexing,
}

impl IngestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::DurablyStored => "durably_stored",
            Self::Indexed => "indexed",
            Self::EnrichmentScheduled => "enrichment_scheduled",
            Self::Accepted => "accepted",
            Self::RejectedAtDurableWrite => "rejected_at_durable_write",
            Self::RejectedAtIndexing => "rejected_at_indexing",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Accepted | Self::RejectedAtDurableWrite | Self::RejectedAtIndexing
        )
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identities assigned to an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReceipt {
    pub durable_id: DurableId,
    pub analytics_id: AnalyticsId,
    /// False when the enrichment queue dropped the job.
    pub enrichment_scheduled: bool,
}

/// Runs an event through durable commit, indexing and enrichment scheduling.
///
/// Store handles are injected at construction and shared across requests.
#[derive(Clone)]
pub struct IngestionCoordinator {
    durable: Arc<dyn DurableStore>,
    indexer: RetryingIndexer,
    enrichment: EnrichmentQueue,
}

impl IngestionCoordinator {
    pub fn new(
        durable: Arc<dyn DurableStore>,
        indexer: RetryingIndexer,
        enrichment: EnrichmentQueue,
    ) -> Self {
        Self {
            durable,
            indexer,
            enrichment,
        }
    }

    /// Ingests `event` on a separate task and waits for the outcome.
    ///
    /// Dropping the returned future (a client disconnect, for example) does
    /// not stop the run: the durable commit, every index attempt and backoff
    /// and the enrichment hand-off still complete.
    pub async fn ingest_detached(&self, event: Event) -> Result<IngestReceipt> {
        let coordinator = self.clone();
        tokio::spawn(async move { coordinator.ingest(&event).await })
            .await
            .map_err(|e| {
                error!(error = %e, "Ingest task did not complete");
                Error::internal(format!("ingest task failed: {}", e))
            })?
    }

    /// Ingests one validated event.
    ///
    /// Fails with [`Error::DurableWrite`] if the durable commit fails, and
    /// with [`Error::BackendUnavailable`] or [`Error::Indexing`] if indexing
    /// fails. Enrichment outcomes never affect the result.
    #[instrument(
        name = "ingest",
        skip_all,
        fields(source = %event.source, host = %event.host, severity = %event.severity)
    )]
    pub async fn ingest(&self, event: &Event) -> Result<IngestReceipt> {
        let start = Instant::now();
        info!(
            state = %IngestState::Received,
            source = %event.source,
            host = %event.host,
            severity = %event.severity,
            "event_received"
        );

        let durable_id = self.durable.commit(event).await.map_err(|e| {
            error!(state = %IngestState::RejectedAtDurableWrite, error = %e, "Durable write failed");
            Error::DurableWrite(e)
        })?;
        debug!(state = %IngestState::DurablyStored, durable_id = %durable_id);

        let analytics_id = self.indexer.index(event).await.map_err(|e| {
            error!(
                state = %IngestState::RejectedAtIndexing,
                durable_id = %durable_id,
                error = %e,
                "Indexing failed; durable record kept"
            );
            e
        })?;
        debug!(state = %IngestState::Indexed, analytics_id = %analytics_id);

        let enrichment_scheduled = self.enrichment.schedule(EnrichmentJob {
            event: event.clone(),
            durable_id: durable_id.clone(),
            analytics_id,
        });
        if enrichment_scheduled {
            debug!(state = %IngestState::EnrichmentScheduled, durable_id = %durable_id);
        }

        let latency_ms = start.elapsed().as_millis() as u64;
        metrics().events_accepted.inc();
        metrics().ingest_latency_ms.observe(latency_ms);

        info!(
            state = %IngestState::Accepted,
            durable_id = %durable_id,
            analytics_id = %analytics_id,
            enrichment_scheduled,
            latency_ms,
            "Event accepted"
        );

        Ok(IngestReceipt {
            durable_id,
            analytics_id,
            enrichment_scheduled,
        })
    }
}
