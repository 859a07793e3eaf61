//! MongoDB durable store for the ingestion service.

pub mod client;
pub mod config;
pub mod health;
pub mod store;

pub use client::*;
pub use config::*;
pub use store::MongoEventStore;
