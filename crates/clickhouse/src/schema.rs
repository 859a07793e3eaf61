//! ClickHouse DDL for the analytics store.
//!
//! One row per indexed document. `doc_id` is assigned per write attempt and
//! is not derived from the event, so a retried write that had partially
//! landed shows up as a second row.

use crate::config::ClickHouseConfig;

/// `CREATE DATABASE` statement for the configured database.
pub fn create_database(config: &ClickHouseConfig) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {}", config.database)
}

/// `CREATE TABLE` statement for the events table.
pub fn create_events_table(config: &ClickHouseConfig) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {table} (
    doc_id String,
    source LowCardinality(String),
    host String,
    severity LowCardinality(String),
    message String,
    timestamp DateTime64(3, 'UTC'),
    indexed_at DateTime64(3, 'UTC')
)
ENGINE = MergeTree()
PARTITION BY toYYYYMM(timestamp)
ORDER BY (severity, timestamp, doc_id)
SETTINGS index_granularity = 8192
"#,
        table = config.qualified_table()
    )
}
