//! Deferred enrichment of accepted events.
//!
//! The request path hands an [`EnrichmentJob`] to an [`EnrichmentQueue`] and
//! returns immediately. An [`EnrichmentWorker`] running on its own task drains
//! the queue and runs each job once through an [`Enricher`]. Failures are
//! logged and counted; nothing is retried and nothing reaches the caller.

use std::sync::Arc;

use async_trait::async_trait;
use engine_core::{AnalyticsId, DurableId, Event};
use telemetry::metrics;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// A detached copy of an accepted event plus the identities both stores
/// assigned to it.
#[derive(Debug, Clone)]
pub struct EnrichmentJob {
    pub event: Event,
    pub durable_id: DurableId,
    pub analytics_id: AnalyticsId,
}

/// Failure raised by an enricher.
#[derive(Debug, Error)]
#[error("enrichment failed: {0}")]
pub struct EnrichmentError(pub String);

impl EnrichmentError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Hook run once per accepted event.
#[async_trait]
pub trait Enricher: Send + Sync + 'static {
    async fn enrich(&self, job: &EnrichmentJob) -> Result<(), EnrichmentError>;
}

/// Default hook: records the accepted event as a structured log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEnricher;

#[async_trait]
impl Enricher for LogEnricher {
    async fn enrich(&self, job: &EnrichmentJob) -> Result<(), EnrichmentError> {
        info!(
            source = %job.event.source,
            host = %job.event.host,
            severity = %job.event.severity,
            durable_id = %job.durable_id,
            analytics_id = %job.analytics_id,
            "event_enriched"
        );
        Ok(())
    }
}

/// Sending half handed to the request path. Cloning is cheap.
#[derive(Clone)]
pub struct EnrichmentQueue {
    tx: mpsc::Sender<EnrichmentJob>,
}

impl EnrichmentQueue {
    /// Enqueues `job` without waiting. Returns false if the job was dropped
    /// because the queue is full or the worker has stopped.
    pub fn schedule(&self, job: EnrichmentJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => {
                metrics().enrichment_scheduled.inc();
                true
            }
            Err(TrySendError::Full(job)) => {
                metrics().enrichment_dropped.inc();
                warn!(durable_id = %job.durable_id, "Enrichment queue full, dropping job");
                false
            }
            Err(TrySendError::Closed(job)) => {
                metrics().enrichment_dropped.inc();
                warn!(durable_id = %job.durable_id, "Enrichment worker stopped, dropping job");
                false
            }
        }
    }
}

/// Receiving half; run it on its own task with [`EnrichmentWorker::run`].
pub struct EnrichmentWorker {
    rx: mpsc::Receiver<EnrichmentJob>,
    enricher: Arc<dyn Enricher>,
}

/// Creates a bounded queue and the worker that drains it.
pub fn enrichment_channel(
    capacity: usize,
    enricher: Arc<dyn Enricher>,
) -> (EnrichmentQueue, EnrichmentWorker) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EnrichmentQueue { tx }, EnrichmentWorker { rx, enricher })
}

type JobOutcome = Result<(), (DurableId, EnrichmentError)>;

impl EnrichmentWorker {
    /// Runs until every queue handle is dropped and in-flight jobs finish.
    ///
    /// Each job runs on its own task so a slow or panicking enricher cannot
    /// stall or kill the worker.
    pub async fn run(mut self) {
        let mut tasks: JoinSet<JobOutcome> = JoinSet::new();

        loop {
            tokio::select! {
                job = self.rx.recv() => match job {
                    Some(job) => self.spawn(&mut tasks, job),
                    None => break,
                },
                Some(result) = tasks.join_next(), if !tasks.is_empty() => record(result),
            }
        }

        while let Some(result) = tasks.join_next().await {
            record(result);
        }

        debug!("Enrichment worker stopped");
    }

    fn spawn(&self, tasks: &mut JoinSet<JobOutcome>, job: EnrichmentJob) {
        let enricher = self.enricher.clone();
        metrics().enrichment_in_flight.inc();
        tasks.spawn(async move {
            enricher
                .enrich(&job)
                .await
                .map_err(|e| (job.durable_id, e))
        });
    }
}

fn record(result: Result<JobOutcome, JoinError>) {
    metrics().enrichment_in_flight.dec();

    match result {
        Ok(Ok(())) => metrics().enrichment_completed.inc(),
        Ok(Err((durable_id, e))) => {
            metrics().enrichment_failed.inc();
            warn!(durable_id = %durable_id, error = %e, "Enrichment failed");
        }
        Err(e) => {
            metrics().enrichment_failed.inc();
            if e.is_panic() {
                error!("Enrichment task panicked");
            } else {
                error!(error = %e, "Enrichment task aborted");
            }
        }
    }
}
