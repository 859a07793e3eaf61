//! Size limits for inbound events and read paths.
//!
//! The `#[validate]` derive needs literal values, so the field limits are
//! repeated on `Event`. Keep both in sync when modifying.

/// Maximum request body size in bytes (1MB).
pub const MAX_BODY_SIZE_BYTES: usize = 1024 * 1024;

/// Maximum length of `source`, `host` and `severity`.
pub const MAX_LABEL_LENGTH: u64 = 256;

/// Maximum length of `message` (64KB).
pub const MAX_MESSAGE_LENGTH: u64 = 64 * 1024;

/// Fixed page size of the analytics query.
pub const PAGE_SIZE: u32 = 10;

/// Default number of records listed from the durable store.
pub const DEFAULT_DURABLE_LIST_LIMIT: u32 = 5;

/// Upper bound on a durable store listing.
pub const MAX_DURABLE_LIST_LIMIT: u32 = 100;
