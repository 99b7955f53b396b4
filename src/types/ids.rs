//! Identifier helpers
//!
//! Entity ids are caller-supplied opaque strings; the store only requires them
//! to be non-empty. Callers that need fresh ids can use [`new_id`].

use uuid::Uuid;

/// Generate a fresh random identifier (UUID v4, hyphenated)
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
