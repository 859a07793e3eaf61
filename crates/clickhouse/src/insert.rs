//! Single-document insert into the analytics table.

use crate::client::{classify, ClickHouseClient};
use chrono::{DateTime, Utc};
use clickhouse::Row;
use engine_core::{AnalyticsDocument, AnalyticsId, StoreError};
use serde::{Deserialize, Serialize};
use telemetry::metrics;
use tracing::debug;
use uuid::Uuid;

/// Row layout of the events table.
#[derive(Debug, Clone, Row, Serialize, Deserialize)]
pub struct EventDocumentRow {
    pub doc_id: String,
    pub source: String,
    pub host: String,
    pub severity: String,
    pub message: String,
    pub timestamp: i64,  // DateTime64(3) as milliseconds
    pub indexed_at: i64, // DateTime64(3) as milliseconds
}

impl From<&AnalyticsDocument> for EventDocumentRow {
    fn from(doc: &AnalyticsDocument) -> Self {
        Self {
            doc_id: doc.doc_id.to_string(),
            source: doc.source.clone(),
            host: doc.host.clone(),
            severity: doc.severity.clone(),
            message: doc.message.clone(),
            timestamp: doc.timestamp.timestamp_millis(),
            indexed_at: doc.indexed_at.timestamp_millis(),
        }
    }
}

impl TryFrom<EventDocumentRow> for AnalyticsDocument {
    type Error = StoreError;

    fn try_from(row: EventDocumentRow) -> Result<Self, Self::Error> {
        let doc_id = Uuid::parse_str(&row.doc_id)
            .map_err(|e| StoreError::rejected(format!("bad doc_id {:?}: {}", row.doc_id, e)))?;

        Ok(Self {
            doc_id: AnalyticsId::from_uuid(doc_id),
            source: row.source,
            host: row.host,
            severity: row.severity,
            message: row.message,
            timestamp: from_millis(row.timestamp)?,
            indexed_at: from_millis(row.indexed_at)?,
        })
    }
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::rejected(format!("timestamp out of range: {}", ms)))
}

/// Writes one document in a single attempt.
pub async fn insert_document(
    client: &ClickHouseClient,
    doc: &AnalyticsDocument,
) -> Result<(), StoreError> {
    let start = std::time::Instant::now();
    let row = EventDocumentRow::from(doc);
    let table = client.events_table();

    let mut insert = client
        .inner()
        .insert::<EventDocumentRow>(&table)
        .map_err(|e| classify(&e))?;

    insert.write(&row).await.map_err(|e| classify(&e))?;
    insert.end().await.map_err(|e| classify(&e))?;

    let elapsed = start.elapsed();
    metrics().index_latency_ms.observe(elapsed.as_millis() as u64);

    debug!(
        doc_id = %doc.doc_id,
        latency_ms = %elapsed.as_millis(),
        "Inserted document into ClickHouse"
    );

    Ok(())
}
