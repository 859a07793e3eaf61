//! MongoDB configuration.

use serde::{Deserialize, Serialize};

/// MongoDB client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    /// Connection string
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    /// How long to wait for a reachable server before failing an operation
    #[serde(default = "default_server_selection_timeout_secs")]
    pub server_selection_timeout_secs: u64,
}

fn default_database() -> String {
    "ingestion".to_string()
}

fn default_collection() -> String {
    "events".to_string()
}

fn default_server_selection_timeout_secs() -> u64 {
    5
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: default_database(),
            collection: default_collection(),
            server_selection_timeout_secs: default_server_selection_timeout_secs(),
        }
    }
}
