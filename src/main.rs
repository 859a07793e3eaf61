//! Event Ingestion Service
//!
//! Accepts security/operational events over HTTP and dual-writes them:
//! - MongoDB as the durable system of record
//! - ClickHouse as the searchable analytics copy, with bounded retries
//! - Background enrichment that never holds up the response

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use clickhouse_client::{ClickHouseClient, ClickHouseConfig, ClickHouseEventStore};
use engine_core::{AnalyticsStore, DurableStore};
use mongo_store::{MongoClient, MongoConfig, MongoEventStore};
use pipeline::{IngestionCoordinator, QueryGateway, RetryPolicy, RetryingIndexer};
use telemetry::{health, init_tracing_from_env};
use worker::{LogEnricher, WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    mongo: MongoConfig,

    #[serde(default)]
    clickhouse: ClickHouseConfig,

    #[serde(default)]
    indexer: RetryPolicy,

    #[serde(default)]
    enrichment: EnrichmentConfig,

    #[serde(default = "default_health_check_interval_secs")]
    health_check_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EnrichmentConfig {
    /// Jobs buffered before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    queue_capacity: usize,
    /// How long shutdown waits for queued jobs
    #[serde(default = "default_shutdown_grace_ms")]
    shutdown_grace_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_shutdown_grace_ms() -> u64 {
    2000
}

fn default_health_check_interval_secs() -> u64 {
    30
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mongo: MongoConfig::default(),
            clickhouse: ClickHouseConfig::default(),
            indexer: RetryPolicy::default(),
            enrichment: EnrichmentConfig::default(),
            health_check_interval_secs: default_health_check_interval_secs(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Event Ingestion Service v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        mongo_database = %config.mongo.database,
        clickhouse_url = %config.clickhouse.url,
        clickhouse_table = %config.clickhouse.qualified_table(),
        max_attempts = config.indexer.max_attempts,
        backoff_unit_ms = config.indexer.backoff_unit_ms,
        "Loaded config"
    );

    // Durable store. The driver connects lazily, so an unreachable server
    // shows up in the health check rather than failing startup.
    let mongo = MongoClient::new(config.mongo.clone())
        .await
        .context("Failed to create MongoDB client")?;
    let mongo_store = Arc::new(MongoEventStore::new(mongo));

    let clickhouse = ClickHouseClient::new(config.clickhouse.clone());
    if let Err(e) = clickhouse_client::health::init_schema(&clickhouse).await {
        error!("Failed to initialize ClickHouse schema: {}", e);
        // Continue anyway - schema might already exist
    }
    let clickhouse_store = Arc::new(ClickHouseEventStore::new(clickhouse));

    check_health(&mongo_store, &clickhouse_store).await;

    let durable: Arc<dyn DurableStore> = mongo_store;
    let analytics: Arc<dyn AnalyticsStore> = clickhouse_store;

    let scheduler = WorkerScheduler::new(
        WorkerConfig {
            enrichment_queue_capacity: config.enrichment.queue_capacity,
            health_check_interval: Duration::from_secs(config.health_check_interval_secs),
        },
        durable.clone(),
        analytics.clone(),
    );
    let (enrichment_queue, worker_handles) = scheduler.start(Arc::new(LogEnricher));

    let indexer = RetryingIndexer::new(analytics.clone(), config.indexer);
    let coordinator = IngestionCoordinator::new(durable.clone(), indexer, enrichment_queue);
    let state = AppState::new(coordinator, QueryGateway::new(durable, analytics));

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // The router owns the only enrichment queue handle; it is dropped when
    // serve returns, which lets the enrichment worker drain and stop.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");

    worker_handles
        .shutdown(Duration::from_millis(config.enrichment.shutdown_grace_ms))
        .await;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("INGESTION")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat overrides; nested parsing does not cope with underscored field names
    if let Ok(uri) = std::env::var("INGESTION_MONGO_URI") {
        config.mongo.uri = uri;
    }
    if let Ok(database) = std::env::var("INGESTION_MONGO_DATABASE") {
        config.mongo.database = database;
    }
    if let Ok(collection) = std::env::var("INGESTION_MONGO_COLLECTION") {
        config.mongo.collection = collection;
    }

    if let Ok(url) = std::env::var("INGESTION_CLICKHOUSE_URL") {
        config.clickhouse.url = url;
    }
    if let Ok(database) = std::env::var("INGESTION_CLICKHOUSE_DATABASE") {
        config.clickhouse.database = database;
    }
    if let Ok(username) = std::env::var("INGESTION_CLICKHOUSE_USERNAME") {
        config.clickhouse.username = Some(username);
    }
    if let Ok(password) = std::env::var("INGESTION_CLICKHOUSE_PASSWORD") {
        config.clickhouse.password = Some(password);
    }

    if let Ok(attempts) = std::env::var("INGESTION_INDEXER_MAX_ATTEMPTS") {
        config.indexer.max_attempts = attempts
            .parse()
            .context("INGESTION_INDEXER_MAX_ATTEMPTS must be an integer")?;
    }
    if let Ok(unit) = std::env::var("INGESTION_INDEXER_BACKOFF_UNIT_MS") {
        config.indexer.backoff_unit_ms = unit
            .parse()
            .context("INGESTION_INDEXER_BACKOFF_UNIT_MS must be an integer")?;
    }

    if config.indexer.max_attempts == 0 {
        warn!("indexer.max_attempts is 0; one attempt will still be made");
    }

    Ok(config)
}

/// Check store health on startup.
async fn check_health(mongo: &MongoEventStore, clickhouse: &ClickHouseEventStore) {
    if mongo_store::health::check_connection(mongo).await {
        health().mongo.set_healthy();
        info!("MongoDB connection: healthy");
    } else {
        health().mongo.set_unhealthy("Connection failed");
        error!("MongoDB connection: unhealthy");
    }

    if clickhouse_client::health::check_connection(clickhouse.client()).await {
        health().clickhouse.set_healthy();
        info!("ClickHouse connection: healthy");
    } else {
        health().clickhouse.set_unhealthy("Connection failed");
        error!("ClickHouse connection: unhealthy");
    }
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
