//! List options, results and page-size normalization

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};

/// Options for a `list` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Opaque cursor from a previous page; empty starts at the beginning
    #[serde(default)]
    pub cursor: String,
    /// Requested page size; zero selects the default
    #[serde(default)]
    pub limit: usize,
}

impl ListOptions {
    /// First page with the given limit
    pub fn with_limit(limit: usize) -> Self {
        Self {
            cursor: String::new(),
            limit,
        }
    }

    /// Page following `cursor`
    pub fn after(cursor: impl Into<String>, limit: usize) -> Self {
        Self {
            cursor: cursor.into(),
            limit,
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    /// Items in `(updated_at DESC, id ASC)` order
    pub items: Vec<T>,
    /// Cursor for the next page; empty on the last page
    pub next_cursor: String,
}

impl<T> ListResult<T> {
    /// An empty, final page
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: String::new(),
        }
    }

    /// Whether more pages follow
    pub fn has_more(&self) -> bool {
        !self.next_cursor.is_empty()
    }
}

/// Page-size policy
///
/// Zero selects `default_size`; the result is always within
/// `1..=max_size`, even if `default_size` is configured above `max_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Size used for a zero limit
    pub default_size: usize,
    /// Upper bound for any page
    pub max_size: usize,
}

impl PageLimits {
    /// Normalize a requested limit
    pub fn normalize(&self, requested: usize) -> usize {
        let requested = if requested == 0 { self.default_size } else { requested };
        requested.clamp(1, self.max_size.max(1))
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_selects_default() {
        assert_eq!(PageLimits::default().normalize(0), 100);
    }

    #[test]
    fn over_maximum_is_clamped() {
        let limits = PageLimits::default();
        assert_eq!(limits.normalize(500), 500);
        assert_eq!(limits.normalize(501), 500);
        assert_eq!(limits.normalize(usize::MAX), 500);
    }

    #[test]
    fn default_above_maximum_is_clamped() {
        let limits = PageLimits { default_size: 600, max_size: 500 };
        assert_eq!(limits.normalize(0), 500);
        let zero = PageLimits { default_size: 0, max_size: 0 };
        assert_eq!(zero.normalize(0), 1);
    }

    #[test]
    fn in_range_is_kept() {
        assert_eq!(PageLimits::default().normalize(7), 7);
    }
}
