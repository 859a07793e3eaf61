//! Core types, store contracts, and validation for the event ingestion service.

pub mod error;
pub mod events;
pub mod limits;
pub mod store;

pub use error::{Error, Result};
pub use events::*;
pub use store::*;
