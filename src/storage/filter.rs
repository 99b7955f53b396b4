//! Backend-typed list filters
//!
//! Each backend exposes its own filter builder per entity kind. The
//! [`Storage`](crate::storage::Storage) list methods accept them as
//! `&dyn ListFilter`, and a backend only accepts its own concrete builder for
//! the matching entity kind. Anything else is rejected with
//! `InvalidArgument` before storage is touched.

use crate::types::error::{Error, Result};
use std::any::{type_name, Any};

/// A filter value that can be handed to a `list_*` call
pub trait ListFilter: Any + Send + Sync {
    /// Backend that built this filter
    fn backend(&self) -> &'static str;

    /// Entity kind this filter applies to
    fn entity_kind(&self) -> &'static str;

    /// Upcast for concrete-type checks
    fn as_any(&self) -> &dyn Any;
}

/// Resolve an optional trait-object filter to the concrete type `F`
///
/// `None` stays `None`. A filter of any other concrete type is an
/// `InvalidArgument` error.
pub fn downcast_filter<'a, F: ListFilter>(filter: Option<&'a dyn ListFilter>) -> Result<Option<&'a F>> {
    match filter {
        None => Ok(None),
        Some(filter) => match filter.as_any().downcast_ref::<F>() {
            Some(concrete) => Ok(Some(concrete)),
            None => Err(Error::invalid_argument(format!(
                "filter for {} on backend {:?} cannot be used here, expected {}",
                filter.entity_kind(),
                filter.backend(),
                type_name::<F>()
            ))),
        },
    }
}
