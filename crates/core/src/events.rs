//! Event type definitions for the ingestion service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::store::{AnalyticsId, DurableId};

/// A single security/operational event as submitted by a producer.
///
/// All five fields are required. Once accepted the pipeline only borrows or
/// clones an event; stores receive copies and assign their own identities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Event {
    /// Producer identity (e.g. "ids", "firewall")
    #[validate(length(min = 1, max = 256))]
    pub source: String,
    /// Origin host
    #[validate(length(min = 1, max = 256))]
    pub host: String,
    /// Severity level; an open set, matched by exact equality
    #[validate(length(min = 1, max = 256))]
    pub severity: String,
    /// Free text
    #[validate(length(max = 65536))]
    pub message: String,
    /// Caller-supplied event time
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(
        source: impl Into<String>,
        host: impl Into<String>,
        severity: impl Into<String>,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            source: source.into(),
            host: host.into(),
            severity: severity.into(),
            message: message.into(),
            timestamp,
        }
    }
}

/// A document as held by the analytics store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsDocument {
    pub doc_id: AnalyticsId,
    pub source: String,
    pub host: String,
    pub severity: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub indexed_at: DateTime<Utc>,
}

impl AnalyticsDocument {
    /// Builds the document written for `event` under a fresh identity.
    pub fn from_event(event: &Event) -> Self {
        Self {
            doc_id: AnalyticsId::new(),
            source: event.source.clone(),
            host: event.host.clone(),
            severity: event.severity.clone(),
            message: event.message.clone(),
            timestamp: event.timestamp,
            indexed_at: Utc::now(),
        }
    }
}

/// A record as held by the durable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableRecord {
    #[serde(rename = "_id")]
    pub id: DurableId,
    pub source: String,
    pub host: String,
    pub severity: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Filter for analytics searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Exact-match severity; `None` matches every document
    pub severity: Option<String>,
}

impl EventQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn severity(severity: impl Into<String>) -> Self {
        Self {
            severity: Some(severity.into()),
        }
    }

    /// Returns true if `doc` passes this filter.
    pub fn matches(&self, doc: &AnalyticsDocument) -> bool {
        match &self.severity {
            Some(severity) => doc.severity == *severity,
            None => true,
        }
    }
}
