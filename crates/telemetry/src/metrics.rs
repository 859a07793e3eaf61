//! Internal metrics collection.
//!
//! Counters live in memory and are exposed through the health endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        // Saturate at zero; a stray dec must not wrap the gauge.
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the ingestion service.
#[derive(Debug, Default)]
pub struct Metrics {
    // Ingestion
    pub events_received: Counter,
    pub events_rejected_validation: Counter,
    pub events_accepted: Counter,

    // Durable store
    pub durable_writes: Counter,
    pub durable_write_errors: Counter,

    // Analytics store
    pub index_attempts: Counter,
    pub index_retries: Counter,
    pub index_exhausted: Counter,
    pub index_errors: Counter,
    pub queries: Counter,
    pub query_errors: Counter,

    // Enrichment
    pub enrichment_scheduled: Counter,
    pub enrichment_dropped: Counter,
    pub enrichment_completed: Counter,
    pub enrichment_failed: Counter,
    pub enrichment_in_flight: Gauge,

    // Latency
    pub ingest_latency_ms: Histogram,
    pub index_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_received: u64,
    pub events_rejected_validation: u64,
    pub events_accepted: u64,
    pub durable_writes: u64,
    pub durable_write_errors: u64,
    pub index_attempts: u64,
    pub index_retries: u64,
    pub index_exhausted: u64,
    pub index_errors: u64,
    pub queries: u64,
    pub query_errors: u64,
    pub enrichment_scheduled: u64,
    pub enrichment_dropped: u64,
    pub enrichment_completed: u64,
    pub enrichment_failed: u64,
    pub enrichment_in_flight: u64,
    pub ingest_latency_mean_ms: f64,
    pub index_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_received: self.events_received.get(),
            events_rejected_validation: self.events_rejected_validation.get(),
            events_accepted: self.events_accepted.get(),
            durable_writes: self.durable_writes.get(),
            durable_write_errors: self.durable_write_errors.get(),
            index_attempts: self.index_attempts.get(),
            index_retries: self.index_retries.get(),
            index_exhausted: self.index_exhausted.get(),
            index_errors: self.index_errors.get(),
            queries: self.queries.get(),
            query_errors: self.query_errors.get(),
            enrichment_scheduled: self.enrichment_scheduled.get(),
            enrichment_dropped: self.enrichment_dropped.get(),
            enrichment_completed: self.enrichment_completed.get(),
            enrichment_failed: self.enrichment_failed.get(),
            enrichment_in_flight: self.enrichment_in_flight.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            index_latency_mean_ms: self.index_latency_ms.mean(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
