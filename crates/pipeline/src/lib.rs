//! The ingestion pipeline.
//!
//! An accepted event is committed to the durable store, then written to the
//! analytics store through the retrying indexer, then handed to the
//! enrichment worker. Reads go through the query gateway.

pub mod coordinator;
pub mod indexer;
pub mod query;

#[cfg(test)]
mod fakes;

pub use coordinator::*;
pub use indexer::*;
pub use query::*;
