//! In-memory store and enricher implementations for testing.
//!
//! These implement the same traits as the MongoDB and ClickHouse stores,
//! so the tests drive the real router, coordinator and indexer without a
//! database.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use engine_core::{
    AnalyticsDocument, AnalyticsId, AnalyticsStore, DurableId, DurableRecord, DurableStore, Event,
    EventQuery, StoreError,
};
use parking_lot::Mutex;
use worker::{Enricher, EnrichmentError, EnrichmentJob};

/// Durable store backed by a vector.
#[derive(Clone, Default)]
pub struct InMemoryDurableStore {
    records: Arc<Mutex<Vec<DurableRecord>>>,
    failure: Arc<Mutex<Option<StoreError>>>,
}

impl InMemoryDurableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<DurableRecord> {
        self.records.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Every subsequent call fails with `err`, or succeeds again on `None`.
    pub fn set_failure(&self, err: Option<StoreError>) {
        *self.failure.lock() = err;
    }

    fn check(&self) -> Result<(), StoreError> {
        match &*self.failure.lock() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn commit(&self, event: &Event) -> Result<DurableId, StoreError> {
        self.check()?;

        let mut records = self.records.lock();
        let id = DurableId::new(format!("{:024x}", records.len() + 1));
        records.push(DurableRecord {
            id: id.clone(),
            source: event.source.clone(),
            host: event.host.clone(),
            severity: event.severity.clone(),
            message: event.message.clone(),
            timestamp: event.timestamp,
        });
        Ok(id)
    }

    async fn list(&self, limit: u32) -> Result<Vec<DurableRecord>, StoreError> {
        self.check()?;

        let mut records = self.records.lock().clone();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}

/// How the in-memory analytics store answers index calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMode {
    Healthy,
    /// The next `n` calls fail with a connectivity error
    ConnectivityFailures(u32),
    /// Every call fails with a connectivity error
    Down,
    /// Every call is rejected
    Rejecting,
}

/// Analytics store backed by a vector, with scripted index failures.
#[derive(Clone)]
pub struct InMemoryAnalyticsStore {
    docs: Arc<Mutex<Vec<AnalyticsDocument>>>,
    mode: Arc<Mutex<IndexMode>>,
    search_failure: Arc<Mutex<Option<StoreError>>>,
    index_attempts: Arc<AtomicUsize>,
}

impl Default for InMemoryAnalyticsStore {
    fn default() -> Self {
        Self {
            docs: Arc::default(),
            mode: Arc::new(Mutex::new(IndexMode::Healthy)),
            search_failure: Arc::default(),
            index_attempts: Arc::default(),
        }
    }
}

impl InMemoryAnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&self, mode: IndexMode) {
        *self.mode.lock() = mode;
    }

    pub fn set_search_failure(&self, err: Option<StoreError>) {
        *self.search_failure.lock() = err;
    }

    pub fn documents(&self) -> Vec<AnalyticsDocument> {
        self.docs.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.docs.lock().len()
    }

    pub fn index_attempts(&self) -> usize {
        self.index_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryAnalyticsStore {
    async fn index(&self, event: &Event) -> Result<AnalyticsId, StoreError> {
        self.index_attempts.fetch_add(1, Ordering::SeqCst);

        {
            let mut mode = self.mode.lock();
            match mode.clone() {
                IndexMode::Healthy => {}
                IndexMode::ConnectivityFailures(0) => *mode = IndexMode::Healthy,
                IndexMode::ConnectivityFailures(n) => {
                    *mode = IndexMode::ConnectivityFailures(n - 1);
                    return Err(StoreError::connectivity("connection refused"));
                }
                IndexMode::Down => return Err(StoreError::connectivity("connection refused")),
                IndexMode::Rejecting => return Err(StoreError::rejected("mapping conflict")),
            }
        }

        let doc = AnalyticsDocument::from_event(event);
        let id = doc.doc_id;
        self.docs.lock().push(doc);
        Ok(id)
    }

    async fn search(
        &self,
        query: &EventQuery,
        limit: u32,
    ) -> Result<Vec<AnalyticsDocument>, StoreError> {
        if let Some(err) = self.search_failure.lock().clone() {
            return Err(err);
        }

        let mut docs: Vec<_> = self
            .docs
            .lock()
            .iter()
            .filter(|d| query.matches(d))
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        docs.truncate(limit as usize);
        Ok(docs)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        match &*self.mode.lock() {
            IndexMode::Down => Err(StoreError::connectivity("connection refused")),
            _ => Ok(()),
        }
    }
}

/// Enricher that records every job it sees and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingEnricher {
    jobs: Arc<Mutex<Vec<EnrichmentJob>>>,
    fail: bool,
}

impl RecordingEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records jobs and then fails every one of them.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn jobs(&self) -> Vec<EnrichmentJob> {
        self.jobs.lock().clone()
    }
}

#[async_trait]
impl Enricher for RecordingEnricher {
    async fn enrich(&self, job: &EnrichmentJob) -> Result<(), EnrichmentError> {
        self.jobs.lock().push(job.clone());
        if self.fail {
            return Err(EnrichmentError::new("threat intel lookup failed"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::event;

    #[tokio::test]
    async fn test_durable_store_lists_newest_first() {
        let store = InMemoryDurableStore::new();
        store.commit(&event("low", 1)).await.unwrap();
        store.commit(&event("high", 3)).await.unwrap();
        store.commit(&event("mid", 2)).await.unwrap();

        let listed = store.list(2).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].severity, "high");
        assert_eq!(listed[1].severity, "mid");
    }

    #[tokio::test]
    async fn test_connectivity_failures_run_out() {
        let store = InMemoryAnalyticsStore::new();
        store.set_mode(IndexMode::ConnectivityFailures(1));

        assert!(store.index(&event("high", 1)).await.unwrap_err().is_connectivity());
        store.index(&event("high", 1)).await.unwrap();
        assert_eq!(store.index_attempts(), 2);
        assert_eq!(store.count(), 1);
    }
}
