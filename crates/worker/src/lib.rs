//! Background workers for the ingestion service.
//!
//! - Enrichment (best-effort processing of accepted events)
//! - Health checks (periodic store reachability probes)

pub mod enrichment;
pub mod health_check;
pub mod scheduler;

pub use enrichment::*;
pub use health_check::HealthCheckWorker;
pub use scheduler::*;
