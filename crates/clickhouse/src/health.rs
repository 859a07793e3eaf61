//! ClickHouse health checks.

use crate::client::{classify, ClickHouseClient};
use engine_core::StoreError;
use tracing::{debug, error};

/// Runs `SELECT 1`.
pub async fn ping(client: &ClickHouseClient) -> Result<(), StoreError> {
    client
        .inner()
        .query("SELECT 1")
        .fetch_one::<u8>()
        .await
        .map(|_| ())
        .map_err(|e| classify(&e))
}

/// Check ClickHouse connection health.
pub async fn check_connection(client: &ClickHouseClient) -> bool {
    match ping(client).await {
        Ok(()) => {
            debug!("ClickHouse connection healthy");
            true
        }
        Err(e) => {
            error!("ClickHouse health check failed: {}", e);
            false
        }
    }
}

/// Initialize database schema.
///
/// The database may not exist yet, so `CREATE DATABASE` runs against
/// `default` before the table DDL runs against the configured database.
pub async fn init_schema(client: &ClickHouseClient) -> Result<(), StoreError> {
    use crate::schema::{create_database, create_events_table};

    let config = client.config();

    client
        .inner()
        .clone()
        .with_database("default")
        .query(&create_database(config))
        .execute()
        .await
        .map_err(|e| classify(&e))?;

    client
        .inner()
        .query(&create_events_table(config))
        .execute()
        .await
        .map_err(|e| classify(&e))?;

    debug!(table = %client.events_table(), "ClickHouse schema initialized");
    Ok(())
}
