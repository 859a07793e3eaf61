//! Read functions over the analytics table.

use crate::client::{classify, ClickHouseClient};
use crate::insert::EventDocumentRow;
use engine_core::{AnalyticsDocument, EventQuery, StoreError};

const COLUMNS: &str = "doc_id, source, host, severity, message, timestamp, indexed_at";

/// Fetch up to `limit` documents passing `query`, newest first.
pub async fn search_events(
    client: &ClickHouseClient,
    query: &EventQuery,
    limit: u32,
) -> Result<Vec<AnalyticsDocument>, StoreError> {
    let table = client.events_table();

    let rows: Vec<EventDocumentRow> = match &query.severity {
        Some(severity) => {
            let sql = format!(
                "SELECT {} FROM {} WHERE severity = ? ORDER BY timestamp DESC LIMIT ?",
                COLUMNS, table
            );
            client
                .inner()
                .query(&sql)
                .bind(severity.as_str())
                .bind(limit)
                .fetch_all()
                .await
        }
        None => {
            let sql = format!(
                "SELECT {} FROM {} ORDER BY timestamp DESC LIMIT ?",
                COLUMNS, table
            );
            client.inner().query(&sql).bind(limit).fetch_all().await
        }
    }
    .map_err(|e| classify(&e))?;

    rows.into_iter().map(AnalyticsDocument::try_from).collect()
}

/// Count all documents (for testing).
pub async fn count_all_events(client: &ClickHouseClient) -> Result<u64, StoreError> {
    let sql = format!("SELECT count() FROM {}", client.events_table());
    client
        .inner()
        .query(&sql)
        .fetch_one::<u64>()
        .await
        .map_err(|e| classify(&e))
}

/// Truncate all documents (test cleanup).
pub async fn truncate_events(client: &ClickHouseClient) -> Result<(), StoreError> {
    let sql = format!("TRUNCATE TABLE IF EXISTS {}", client.events_table());
    client
        .inner()
        .query(&sql)
        .execute()
        .await
        .map_err(|e| classify(&e))
}
