//! Durable store backed by a MongoDB collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engine_core::{DurableId, DurableRecord, DurableStore, Event, StoreError};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::Deserialize;
use telemetry::metrics;
use tracing::{debug, error};

use crate::client::{classify, MongoClient};

/// Stored shape of one event.
#[derive(Debug, Deserialize)]
struct StoredEvent {
    #[serde(rename = "_id")]
    id: ObjectId,
    source: String,
    host: String,
    severity: String,
    message: String,
    timestamp: bson::DateTime,
}

impl TryFrom<StoredEvent> for DurableRecord {
    type Error = StoreError;

    fn try_from(stored: StoredEvent) -> Result<Self, Self::Error> {
        let millis = stored.timestamp.timestamp_millis();
        let timestamp = DateTime::<Utc>::from_timestamp_millis(millis)
            .ok_or_else(|| StoreError::rejected(format!("timestamp out of range: {}", millis)))?;

        Ok(Self {
            id: DurableId::new(stored.id.to_hex()),
            source: stored.source,
            host: stored.host,
            severity: stored.severity,
            message: stored.message,
            timestamp,
        })
    }
}

/// Flat document written for an event; `timestamp` is stored as a BSON date.
fn to_document(event: &Event) -> Document {
    doc! {
        "source": event.source.as_str(),
        "host": event.host.as_str(),
        "severity": event.severity.as_str(),
        "message": event.message.as_str(),
        "timestamp": bson::DateTime::from_millis(event.timestamp.timestamp_millis()),
    }
}

/// Writes events to MongoDB. One insert per commit, no retries.
#[derive(Clone)]
pub struct MongoEventStore {
    client: MongoClient,
}

impl MongoEventStore {
    pub fn new(client: MongoClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl DurableStore for MongoEventStore {
    async fn commit(&self, event: &Event) -> Result<DurableId, StoreError> {
        let result = self
            .client
            .events()
            .insert_one(to_document(event))
            .await
            .map_err(|e| {
                metrics().durable_write_errors.inc();
                error!(error = %e, "MongoDB insert failed");
                classify(&e)
            })?;

        let id = result
            .inserted_id
            .as_object_id()
            .map(|oid| DurableId::new(oid.to_hex()))
            .unwrap_or_else(|| DurableId::new(result.inserted_id.to_string()));

        metrics().durable_writes.inc();
        debug!(durable_id = %id, "Committed event to MongoDB");

        Ok(id)
    }

    async fn list(&self, limit: u32) -> Result<Vec<DurableRecord>, StoreError> {
        let cursor = self
            .client
            .events()
            .clone_with_type::<StoredEvent>()
            .find(doc! {})
            .sort(doc! { "timestamp": -1 })
            .limit(i64::from(limit))
            .await
            .map_err(|e| classify(&e))?;

        let stored: Vec<StoredEvent> = cursor.try_collect().await.map_err(|e| classify(&e))?;

        stored.into_iter().map(DurableRecord::try_from).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database()
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| classify(&e))
    }
}
