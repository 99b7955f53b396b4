//! Opaque pagination cursors
//!
//! A cursor marks a position in the `(updated_at DESC, id ASC)` order of a
//! listed collection. On the wire it is URL-safe unpadded base64 over a small
//! JSON object that also carries the issuing backend's tag and format version.
//! Callers must treat the string as opaque.

use crate::types::error::{Error, Result};
use crate::types::Timestamp;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Decoded cursor position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// `updated_at` of the last item on the previous page, in nanoseconds
    #[serde(rename = "t")]
    pub updated_at_nanos: i64,
    /// Id of the last item on the previous page
    #[serde(rename = "i")]
    pub id: String,
    /// Backend that issued the cursor
    #[serde(rename = "b")]
    pub backend_tag: String,
    /// Cursor format version
    #[serde(rename = "v")]
    pub version: u32,
}

impl Cursor {
    /// Cursor positioned after the item with the given timestamp and id
    pub fn after(updated_at: Timestamp, id: impl Into<String>) -> Self {
        Self {
            updated_at_nanos: updated_at.as_nanos(),
            id: id.into(),
            backend_tag: String::new(),
            version: 0,
        }
    }

    /// Whether this is the start-of-list cursor
    pub fn is_zero(&self) -> bool {
        self.id.is_empty() && self.updated_at_nanos == 0
    }

    /// Position timestamp
    pub fn updated_at(&self) -> Timestamp {
        Timestamp::from_nanos(self.updated_at_nanos)
    }
}

/// Encoder/decoder bound to one backend tag and version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorCodec {
    backend_tag: &'static str,
    version: u32,
}

impl CursorCodec {
    /// Codec for a backend
    pub const fn new(backend_tag: &'static str, version: u32) -> Self {
        Self { backend_tag, version }
    }

    /// Codec used by the in-memory backend
    pub const fn memory() -> Self {
        Self::new(crate::constants::MEMORY_BACKEND_TAG, crate::constants::MEMORY_CURSOR_VERSION)
    }

    /// Backend tag stamped into issued cursors
    pub fn backend_tag(&self) -> &'static str {
        self.backend_tag
    }

    /// Format version stamped into issued cursors
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Encode a cursor, overwriting its backend tag and version with this codec's
    pub fn encode(&self, cursor: &Cursor) -> Result<String> {
        let stamped = Cursor {
            updated_at_nanos: cursor.updated_at_nanos,
            id: cursor.id.clone(),
            backend_tag: self.backend_tag.to_string(),
            version: self.version,
        };
        let json = serde_json::to_vec(&stamped)
            .map_err(|e| Error::internal(format!("failed to encode cursor: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a cursor; the empty string is the start-of-list cursor
    pub fn decode(&self, token: &str) -> Result<Cursor> {
        if token.is_empty() {
            return Ok(Cursor::default());
        }

        let raw = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| Error::invalid_argument(format!("invalid cursor encoding: {e}")))?;
        let cursor: Cursor = serde_json::from_slice(&raw)
            .map_err(|e| Error::invalid_argument(format!("invalid cursor payload: {e}")))?;

        if cursor.backend_tag != self.backend_tag {
            return Err(Error::invalid_argument(format!(
                "cursor issued by backend {:?}, expected {:?}",
                cursor.backend_tag, self.backend_tag
            )));
        }
        if cursor.version != self.version {
            return Err(Error::invalid_argument(format!(
                "cursor version {} not supported, expected {}",
                cursor.version, self.version
            )));
        }
        if cursor.id.is_empty() {
            return Err(Error::invalid_argument("cursor is missing an id"));
        }
        if cursor.updated_at_nanos == 0 {
            return Err(Error::invalid_argument("cursor is missing a timestamp"));
        }
        Ok(cursor)
    }
}
