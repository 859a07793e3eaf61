//! Application state shared across handlers.

use pipeline::{IngestionCoordinator, QueryGateway};

/// Shared application state.
///
/// Holds the write path and the read path. Both wrap injected store
/// handles, so cloning the state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Durable commit, indexing and enrichment scheduling
    pub coordinator: IngestionCoordinator,
    /// Analytics search and durable listing
    pub queries: QueryGateway,
}

impl AppState {
    pub fn new(coordinator: IngestionCoordinator, queries: QueryGateway) -> Self {
        Self {
            coordinator,
            queries,
        }
    }
}
