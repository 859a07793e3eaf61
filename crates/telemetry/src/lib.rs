//! Telemetry for the event ingestion service: structured logging setup,
//! in-process metrics and the store health registry.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
