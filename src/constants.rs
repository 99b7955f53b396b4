//! Global constants used throughout the fleet store
//!
//! Shared across modules to keep pagination and cursor behavior consistent
//! between the store, the configuration defaults and the tests.

/// Page size used when a caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page a single `list` call returns
///
/// Requests above this are clamped to it.
pub const MAX_PAGE_SIZE: usize = 500;

/// How many items a scan processes between cancellation checks
pub const SCAN_BATCH_SIZE: usize = 1_000;

/// Page size used by uniqueness lookups
///
/// Two is enough to tell "exactly one" from "more than one".
pub const UNIQUE_PROBE_LIMIT: usize = 2;

/// Backend tag embedded in cursors issued by the in-memory backend
pub const MEMORY_BACKEND_TAG: &str = "memory";

/// Cursor format version for the in-memory backend
pub const MEMORY_CURSOR_VERSION: u32 = 1;
