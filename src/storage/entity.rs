//! The contract every stored value satisfies

use crate::types::Timestamp;

/// A value that can be held by a [`GenericStore`](crate::storage::memory::GenericStore).
///
/// `Clone` must produce a value sharing no mutable structure with the
/// original. For the owned domain types in this crate that is plain derived
/// `Clone`. Persisted values need a non-empty [`id`](Entity::id) and a
/// non-zero [`updated_at`](Entity::updated_at) that changes on every mutation.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Lowercase kind name used in error messages and metric labels
    const KIND: &'static str;

    /// Unique identifier
    fn id(&self) -> &str;

    /// Last-modified time
    fn updated_at(&self) -> Timestamp;
}
