//! MongoDB client wrapper.

use std::time::Duration;

use engine_core::StoreError;
use mongodb::{
    bson::Document,
    error::{Error as MongoError, ErrorKind},
    options::ClientOptions,
    Client, Collection, Database,
};
use tracing::info;

use crate::config::MongoConfig;

/// MongoDB client wrapper. The driver pools connections internally, so one
/// instance is shared by every request.
#[derive(Clone)]
pub struct MongoClient {
    inner: Client,
    config: MongoConfig,
}

impl MongoClient {
    /// Creates a new client. No connection is made until the first operation.
    pub async fn new(config: MongoConfig) -> Result<Self, StoreError> {
        let options = client_options(&config).await?;

        let inner = Client::with_options(options)
            .map_err(|e| StoreError::rejected(format!("Failed to create MongoDB client: {}", e)))?;

        info!(
            database = %config.database,
            collection = %config.collection,
            "Created MongoDB client"
        );

        Ok(Self { inner, config })
    }

    pub fn database(&self) -> Database {
        self.inner.database(&self.config.database)
    }

    /// The events collection.
    pub fn events(&self) -> Collection<Document> {
        self.database().collection(&self.config.collection)
    }

    pub fn config(&self) -> &MongoConfig {
        &self.config
    }
}

/// Driver options for `config`.
///
/// Driver-level write retries are off: a durable commit is attempted exactly
/// once, even when the URI asks for `retryWrites=true`.
pub async fn client_options(config: &MongoConfig) -> Result<ClientOptions, StoreError> {
    let mut options = ClientOptions::parse(&config.uri)
        .await
        .map_err(|e| StoreError::rejected(format!("Invalid MongoDB URI: {}", e)))?;
    options.app_name = Some("event-ingest".to_string());
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    options.retry_writes = Some(false);
    Ok(options)
}

/// Maps a driver error onto the store taxonomy.
pub fn classify(err: &MongoError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => StoreError::connectivity(err.to_string()),
        _ => StoreError::rejected(err.to_string()),
    }
}
