//! Worker scheduler for background tasks.

use std::sync::Arc;
use std::time::Duration;

use engine_core::{AnalyticsStore, DurableStore};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{info, warn};

use crate::enrichment::{enrichment_channel, Enricher, EnrichmentQueue};
use crate::health_check::HealthCheckWorker;

/// Worker scheduler configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Enrichment jobs buffered before new ones are dropped
    pub enrichment_queue_capacity: usize,
    /// Store health probe interval
    pub health_check_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enrichment_queue_capacity: 1024,
            health_check_interval: Duration::from_secs(30),
        }
    }
}

/// Handles to the spawned background workers.
pub struct WorkerHandles {
    pub enrichment: JoinHandle<()>,
    pub health_check: JoinHandle<()>,
}

impl WorkerHandles {
    /// Stops the health probe and gives the enrichment worker up to `grace`
    /// to finish queued jobs. Anything still running after that is abandoned.
    ///
    /// Every [`EnrichmentQueue`] clone must be dropped first, otherwise the
    /// enrichment worker keeps waiting for jobs until the grace period ends.
    pub async fn shutdown(self, grace: Duration) {
        self.health_check.abort();

        let mut enrichment = self.enrichment;
        match tokio::time::timeout(grace, &mut enrichment).await {
            Ok(_) => info!("Enrichment worker drained"),
            Err(_) => {
                warn!(grace_ms = grace.as_millis() as u64, "Enrichment worker did not drain, abandoning");
                enrichment.abort();
            }
        }
    }
}

/// Background worker scheduler.
pub struct WorkerScheduler {
    config: WorkerConfig,
    durable: Arc<dyn DurableStore>,
    analytics: Arc<dyn AnalyticsStore>,
}

impl WorkerScheduler {
    pub fn new(
        config: WorkerConfig,
        durable: Arc<dyn DurableStore>,
        analytics: Arc<dyn AnalyticsStore>,
    ) -> Self {
        Self {
            config,
            durable,
            analytics,
        }
    }

    /// Starts all background workers and returns the enrichment queue the
    /// request path schedules into.
    pub fn start(self, enricher: Arc<dyn Enricher>) -> (EnrichmentQueue, WorkerHandles) {
        let (queue, worker) = enrichment_channel(self.config.enrichment_queue_capacity, enricher);
        let enrichment = tokio::spawn(worker.run());
        info!(
            capacity = self.config.enrichment_queue_capacity,
            "Enrichment worker started"
        );

        let probe = HealthCheckWorker::new(self.durable, self.analytics);
        let every = self.config.health_check_interval;
        let health_check = tokio::spawn(async move {
            let mut ticker = interval(every);
            loop {
                ticker.tick().await;
                probe.run().await;
            }
        });
        info!(interval_secs = every.as_secs(), "Health check worker started");

        (
            queue,
            WorkerHandles {
                enrichment,
                health_check,
            },
        )
    }
}
