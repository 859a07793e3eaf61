//! Analytics store backed by a ClickHouse table.

use async_trait::async_trait;
use engine_core::{AnalyticsDocument, AnalyticsId, AnalyticsStore, Event, EventQuery, StoreError};

use crate::client::ClickHouseClient;
use crate::{health, insert, query};

/// Writes and searches event documents in ClickHouse.
///
/// Every `index` call writes a new row under a fresh `doc_id`; there is no
/// deduplication key.
#[derive(Clone)]
pub struct ClickHouseEventStore {
    client: ClickHouseClient,
}

impl ClickHouseEventStore {
    pub fn new(client: ClickHouseClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ClickHouseClient {
        &self.client
    }
}

#[async_trait]
impl AnalyticsStore for ClickHouseEventStore {
    async fn index(&self, event: &Event) -> Result<AnalyticsId, StoreError> {
        let doc = AnalyticsDocument::from_event(event);
        insert::insert_document(&self.client, &doc).await?;
        Ok(doc.doc_id)
    }

    async fn search(
        &self,
        query: &EventQuery,
        limit: u32,
    ) -> Result<Vec<AnalyticsDocument>, StoreError> {
        query::search_events(&self.client, query, limit).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        health::ping(&self.client).await
    }
}
