//! Nanosecond timestamps used for `updated_at` ordering and cursors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Timestamp type optimized for ordering and comparison
///
/// Stored as signed nanoseconds since the Unix epoch so it maps directly onto
/// the cursor's `updated_at_nanos`. The zero value means "unset".
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The unset timestamp
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create timestamp from current time
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos().min(i64::MAX as u128) as i64)
            .unwrap_or_default();
        Self(nanos)
    }

    /// Current time, forced strictly past `prev`
    ///
    /// Used when the store stamps a mutation itself, so `updated_at` changes
    /// even if the clock has not advanced.
    pub fn now_after(prev: Timestamp) -> Self {
        Self::now().advance_past(prev)
    }

    /// Create from nanoseconds since epoch
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Create from milliseconds since epoch
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Get nanoseconds since epoch
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Get milliseconds since epoch
    pub const fn as_millis(&self) -> i64 {
        self.0 / 1_000_000
    }

    /// Whether this is the unset timestamp
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// `self`, or the instant just past `prev` if `self` is not later
    ///
    /// Mutators stamp `updated_at` with this so a replayed or out-of-order
    /// time never leaves it unchanged or moves it backwards.
    pub fn advance_past(self, prev: Timestamp) -> Self {
        if self > prev {
            self
        } else {
            Self(prev.0.saturating_add(1))
        }
    }

    /// Timestamp shifted forward by `d`, saturating at the maximum
    pub fn saturating_add_duration(&self, d: Duration) -> Self {
        let nanos = i64::try_from(d.as_nanos()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(nanos))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ns)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
