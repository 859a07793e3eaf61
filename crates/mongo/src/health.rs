//! MongoDB health checks.

use engine_core::DurableStore;
use tracing::{debug, error};

use crate::store::MongoEventStore;

/// Check MongoDB connection health.
pub async fn check_connection(store: &MongoEventStore) -> bool {
    match store.ping().await {
        Ok(()) => {
            debug!("MongoDB connection healthy");
            true
        }
        Err(e) => {
            error!("MongoDB health check failed: {}", e);
            false
        }
    }
}
