//! Analytics writes with bounded linear backoff.

use std::sync::Arc;
use std::time::Duration;

use engine_core::{AnalyticsId, AnalyticsStore, Error, Event, Result};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::{error, warn};

/// Retry policy for analytics writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Length of one backoff unit in milliseconds
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_unit_ms: default_backoff_unit_ms(),
        }
    }
}

impl RetryPolicy {
    /// Wait after attempt `attempt` (1-based) failed: `attempt` units.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_unit_ms) * attempt
    }
}

/// Writes events to the analytics store, retrying connectivity failures.
///
/// The retry is a blocking one: the calling task sleeps through every
/// backoff. Only connectivity-class failures are retried. A failed attempt
/// may still have landed a document, so a successful retry can leave a
/// duplicate behind.
#[derive(Clone)]
pub struct RetryingIndexer {
    store: Arc<dyn AnalyticsStore>,
    policy: RetryPolicy,
}

impl RetryingIndexer {
    pub fn new(store: Arc<dyn AnalyticsStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Indexes `event` using the configured attempt budget.
    pub async fn index(&self, event: &Event) -> Result<AnalyticsId> {
        self.index_with_retry(event, self.policy.max_attempts).await
    }

    /// Indexes `event` with at most `max_attempts` attempts (minimum 1).
    ///
    /// After attempt `k` fails with a connectivity error the task waits `k`
    /// backoff units. The last attempt is not followed by a wait.
    pub async fn index_with_retry(&self, event: &Event, max_attempts: u32) -> Result<AnalyticsId> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            metrics().index_attempts.inc();

            match self.store.index(event).await {
                Ok(id) => return Ok(id),
                Err(e) if !e.is_connectivity() => {
                    metrics().index_errors.inc();
                    error!(attempt, error = %e, "Analytics write rejected, not retrying");
                    return Err(Error::Indexing(e));
                }
                Err(e) if attempt >= max_attempts => {
                    metrics().index_exhausted.inc();
                    error!(attempts = attempt, error = %e, "Analytics store unreachable, giving up");
                    return Err(Error::BackendUnavailable {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    let backoff = self.policy.backoff_for(attempt);
                    metrics().index_retries.inc();
                    warn!(
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Analytics store unreachable, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}
