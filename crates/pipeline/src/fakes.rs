//! In-memory stores with scripted failures for unit tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use engine_core::{
    AnalyticsDocument, AnalyticsId, AnalyticsStore, DurableId, DurableRecord, DurableStore, Event,
    EventQuery, StoreError,
};
use parking_lot::Mutex;
use tokio::time::Instant;

pub fn sample_event() -> Event {
    Event::new(
        "ids",
        "h1",
        "high",
        "m",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
}

/// Analytics store that replays scripted errors, then succeeds.
#[derive(Default)]
pub struct ScriptedAnalytics {
    script: Mutex<VecDeque<StoreError>>,
    connectivity_failures_left: Mutex<u32>,
    attempts: Mutex<Vec<Instant>>,
    docs: Mutex<Vec<AnalyticsDocument>>,
}

impl ScriptedAnalytics {
    pub fn healthy() -> Self {
        Self::default()
    }

    /// The first `n` attempts fail with a connectivity error.
    pub fn failing_connectivity(n: u32) -> Self {
        Self {
            connectivity_failures_left: Mutex::new(n),
            ..Default::default()
        }
    }

    /// Attempts fail with `errors` in order, then succeed.
    pub fn with_script(errors: Vec<StoreError>) -> Self {
        Self {
            script: Mutex::new(errors.into()),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.lock().len()
    }

    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().clone()
    }

    pub fn documents(&self) -> Vec<AnalyticsDocument> {
        self.docs.lock().clone()
    }

    pub fn insert(&self, doc: AnalyticsDocument) {
        self.docs.lock().push(doc);
    }
}

#[async_trait]
impl AnalyticsStore for ScriptedAnalytics {
    async fn index(&self, event: &Event) -> Result<AnalyticsId, StoreError> {
        self.attempts.lock().push(Instant::now());

        if let Some(err) = self.script.lock().pop_front() {
            return Err(err);
        }

        {
            let mut left = self.connectivity_failures_left.lock();
            if *left > 0 {
                *left -= 1;
                return Err(StoreError::connectivity("connection refused"));
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
        if let Some(err) = self.script.lock().pop_front() {
            return Err(err);
        }

        Ok(self
            .docs
            .lock()
            .iter()
            .filter(|d| query.matches(d))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Durable store that either accepts everything or fails every commit.
#[derive(Default)]
pub struct ScriptedDurable {
    failure: Option<StoreError>,
    records: Mutex<Vec<DurableRecord>>,
}

impl ScriptedDurable {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn failing(err: StoreError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub fn records(&self) -> Vec<DurableRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl DurableStore for ScriptedDurable {
    async fn commit(&self, event: &Event) -> Result<DurableId, StoreError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        let mut records = self.records.lock();
        let id = DurableId::new(format!("rec-{}", records.len()));
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
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.records.lock().iter().take(limit as usize).cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
