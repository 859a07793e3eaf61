//! Store contracts shared by the pipeline, the HTTP layer and the backends.
//!
//! The durable store and the analytics store assign their own identities.
//! `DurableId` and `AnalyticsId` are deliberately separate types and are
//! never converted into each other.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::events::{AnalyticsDocument, DurableRecord, Event, EventQuery};

/// Identity assigned by the durable store (MongoDB ObjectId, hex encoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurableId(String);

impl DurableId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DurableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity assigned by the analytics store, one per written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticsId(Uuid);

impl AnalyticsId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnalyticsId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalyticsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Failure reported by a store backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (network, timeout, refused connection).
    #[error("store unreachable: {0}")]
    Connectivity(String),

    /// The store was reached but did not accept the operation.
    #[error("store rejected operation: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn connectivity(msg: impl Into<String>) -> Self {
        Self::Connectivity(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Connectivity-class failures are the only ones worth retrying.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// The source-of-truth store.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Appends one record for `event`. Called once per request, never retried.
    async fn commit(&self, event: &Event) -> Result<DurableId, StoreError>;

    /// Lists up to `limit` records. No ordering is promised.
    async fn list(&self, limit: u32) -> Result<Vec<DurableRecord>, StoreError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// The searchable copy used for querying.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Writes one document for `event` in a single attempt.
    async fn index(&self, event: &Event) -> Result<AnalyticsId, StoreError>;

    /// Returns up to `limit` documents passing `query`.
    async fn search(
        &self,
        query: &EventQuery,
        limit: u32,
    ) -> Result<Vec<AnalyticsDocument>, StoreError>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;
}
