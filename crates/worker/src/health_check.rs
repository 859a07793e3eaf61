//! Periodic reachability probes for both stores.

use std::sync::Arc;

use engine_core::{AnalyticsStore, DurableStore};
use telemetry::{health, ComponentHealth};
use tracing::{info, warn};

/// Pings the durable and analytics stores and records the outcome in the
/// global health registry.
pub struct HealthCheckWorker {
    durable: Arc<dyn DurableStore>,
    analytics: Arc<dyn AnalyticsStore>,
}

impl HealthCheckWorker {
    pub fn new(durable: Arc<dyn DurableStore>, analytics: Arc<dyn AnalyticsStore>) -> Self {
        Self { durable, analytics }
    }

    /// Probes both stores once.
    pub async fn run(&self) {
        let durable = self.durable.ping().await;
        update(&health().mongo, durable);

        let analytics = self.analytics.ping().await;
        update(&health().clickhouse, analytics);
    }
}

fn update(component: &ComponentHealth, result: Result<(), engine_core::StoreError>) {
    let was_healthy = component.is_healthy();
    match result {
        Ok(()) => {
            if !was_healthy {
                info!(component = component.name(), "Store reachable");
            }
            component.set_healthy();
        }
        Err(e) => {
            if was_healthy {
                warn!(component = component.name(), error = %e, "Store unreachable");
            }
            component.set_unhealthy(e.to_string());
        }
    }
}
