//! Unified error type for the ingestion service.
//!
//! Every pipeline failure collapses into one of two caller-visible shapes:
//! backend unavailable (503) or a generic failure (500). Validation errors
//! are rejected before the pipeline runs.

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Caller-visible detail for an exhausted analytics store.
pub const DETAIL_BACKEND_UNAVAILABLE: &str = "Search backend unavailable";

/// Caller-visible detail for any other ingestion failure.
pub const DETAIL_INGESTION_FAILED: &str = "Ingestion failed";

/// Caller-visible detail for a failed analytics read.
///
/// Deliberately distinct from [`DETAIL_INGESTION_FAILED`]; the status (500)
/// is the same as on the write path.
pub const DETAIL_QUERY_FAILED: &str = "Query failed";

/// Caller-visible detail for a failed durable store listing.
pub const DETAIL_DURABLE_QUERY_FAILED: &str = "Durable store query failed";

/// Unified error type for the ingestion service.
#[derive(Debug, Error)]
pub enum Error {
    /// Body could not be parsed into an event.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Event parsed but broke a field rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// The durable store refused or could not take the write.
    #[error("durable write failed: {0}")]
    DurableWrite(#[source] StoreError),

    /// The analytics store stayed unreachable for every attempt.
    #[error("analytics store unavailable after {attempts} attempts: {source}")]
    BackendUnavailable {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// The analytics store rejected the write.
    #[error("indexing failed: {0}")]
    Indexing(#[source] StoreError),

    /// A read against the analytics store failed.
    #[error("query failed: {0}")]
    Query(#[source] StoreError),

    /// A listing against the durable store failed.
    #[error("durable listing failed: {0}")]
    DurableQuery(#[source] StoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Maps an analytics read failure, keeping connectivity distinct.
    pub fn from_query(err: StoreError) -> Self {
        if err.is_connectivity() {
            Self::BackendUnavailable {
                attempts: 1,
                source: err,
            }
        } else {
            Self::Query(err)
        }
    }

    /// True for failures the caller sees as "backend unavailable".
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidPayload(_) => 400,
            Self::Validation(_) => 422,
            Self::BackendUnavailable { .. } => 503,
            Self::DurableWrite(_)
            | Self::Indexing(_)
            | Self::Query(_)
            | Self::DurableQuery(_)
            | Self::Serialization(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Caller-visible detail text. Store messages never leak to callers.
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidPayload(msg) | Self::Validation(msg) => msg.clone(),
            Self::BackendUnavailable { .. } => DETAIL_BACKEND_UNAVAILABLE.to_string(),
            Self::Query(_) => DETAIL_QUERY_FAILED.to_string(),
            Self::DurableQuery(_) => DETAIL_DURABLE_QUERY_FAILED.to_string(),
            Self::DurableWrite(_) | Self::Indexing(_) | Self::Serialization(_) | Self::Internal(_) => {
                DETAIL_INGESTION_FAILED.to_string()
            }
        }
    }
}
