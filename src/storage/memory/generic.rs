//! Generic in-memory entity store
//!
//! One `GenericStore` holds one entity kind behind its own reader/writer
//! lock. Values are cloned on the way in and on the way out, so nothing a
//! caller holds aliases stored state.
//!
//! Locking:
//! - mutations (`create`, `upsert`, `update`, `delete`) hold the write lock for
//!   the whole critical section, including the `update` transform
//! - `get`/`get_many` hold the read lock only while cloning
//! - `list` holds the read lock only while copying matches into a snapshot;
//!   sorting and cursor positioning run after it is released

use crate::constants::SCAN_BATCH_SIZE;
use crate::storage::cursor::{Cursor, CursorCodec};
use crate::storage::page::{ListOptions, ListResult, PageLimits};
use crate::storage::{Context, Entity};
use crate::system::metrics;
use crate::types::error::{Error, Result};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Predicate applied while taking a list snapshot
pub type Predicate<'a, T> = &'a (dyn Fn(&T) -> bool + Send + Sync);

/// Lock-protected map from id to entity with cursor pagination
pub struct GenericStore<T: Entity> {
    /// Stored values, keyed by id
    items: RwLock<HashMap<String, T>>,
    /// Cursor encoding for this backend
    codec: CursorCodec,
    /// Page-size policy
    limits: PageLimits,
    /// Items scanned between cancellation checks
    scan_batch: usize,
}

/// Total list order: newest first, ties broken by ascending id
fn list_order<T: Entity>(a: &T, b: &T) -> Ordering {
    b.updated_at()
        .cmp(&a.updated_at())
        .then_with(|| a.id().cmp(b.id()))
}

/// Whether `entity` sorts strictly after the cursor position
fn is_after_cursor<T: Entity>(entity: &T, cursor: &Cursor) -> bool {
    match cursor.updated_at().cmp(&entity.updated_at()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => entity.id() > cursor.id.as_str(),
    }
}

impl<T: Entity> GenericStore<T> {
    /// Create an empty store with the memory backend's defaults
    pub fn new() -> Self {
        Self::with_settings(CursorCodec::memory(), PageLimits::default(), SCAN_BATCH_SIZE)
    }

    /// Create an empty store with explicit cursor codec, page limits and scan batch
    pub fn with_settings(codec: CursorCodec, limits: PageLimits, scan_batch: usize) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            codec,
            limits,
            scan_batch: scan_batch.max(1),
        }
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Insert a new entity; fails if the id is taken
    pub fn create(&self, ctx: &Context, entity: &T) -> Result<()> {
        self.observe("create", || {
            ctx.check()?;
            validate(entity)?;
            let mut items = self.items.write();
            if items.contains_key(entity.id()) {
                return Err(Error::already_exists(describe::<T>(entity.id())));
            }
            items.insert(entity.id().to_string(), entity.clone());
            metrics::adjust_entity_count(T::KIND, 1);
            Ok(())
        })
    }

    /// Insert or fully replace an entity
    pub fn upsert(&self, ctx: &Context, entity: &T) -> Result<()> {
        self.observe("upsert", || {
            ctx.check()?;
            validate(entity)?;
            let mut items = self.items.write();
            if items.insert(entity.id().to_string(), entity.clone()).is_none() {
                metrics::adjust_entity_count(T::KIND, 1);
            }
            Ok(())
        })
    }

    /// Atomic read-modify-write
    ///
    /// `transform` receives a clone of the stored value while the write lock
    /// is held. If it fails, or leaves the entity with a different id or a
    /// zero `updated_at`, nothing is stored. Returns the stored value.
    pub fn update<F>(&self, ctx: &Context, id: &str, transform: F) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        self.observe("update", || {
            ctx.check()?;
            require_id::<T>(id)?;
            let mut items = self.items.write();
            let mut next = items
                .get(id)
                .ok_or_else(|| Error::not_found(describe::<T>(id)))?
                .clone();

            transform(&mut next)?;

            if next.id() != id {
                return Err(Error::invalid_argument(format!(
                    "{} update must not change id {:?} to {:?}",
                    T::KIND,
                    id,
                    next.id()
                )));
            }
            validate(&next)?;
            items.insert(id.to_string(), next.clone());
            Ok(next)
        })
    }

    /// Fetch one entity
    pub fn get(&self, ctx: &Context, id: &str) -> Result<T> {
        self.observe("get", || {
            ctx.check()?;
            require_id::<T>(id)?;
            self.items
                .read()
                .get(id)
                .cloned()
                .ok_or_else(|| Error::not_found(describe::<T>(id)))
        })
    }

    /// Fetch several entities in caller order
    ///
    /// Duplicates in `ids` are looked up once and repeated in the output. Any
    /// missing id fails the whole call.
    pub fn get_many<S: AsRef<str>>(&self, ctx: &Context, ids: &[S]) -> Result<Vec<T>> {
        self.observe("get_many", || {
            ctx.check()?;
            if ids.is_empty() {
                return Err(Error::invalid_argument(format!("{} ids must not be empty", T::KIND)));
            }
            for id in ids {
                require_id::<T>(id.as_ref())?;
            }

            let mut found: HashMap<&str, T> = HashMap::with_capacity(ids.len());
            {
                let items = self.items.read();
                for id in ids {
                    let id = id.as_ref();
                    if found.contains_key(id) {
                        continue;
                    }
                    let entity = items.get(id).ok_or_else(|| Error::not_found(describe::<T>(id)))?;
                    found.insert(id, entity.clone());
                }
            }

            Ok(ids
                .iter()
                .filter_map(|id| found.get(id.as_ref()).cloned())
                .collect())
        })
    }

    /// Remove an entity
    pub fn delete(&self, ctx: &Context, id: &str) -> Result<()> {
        self.observe("delete", || {
            ctx.check()?;
            require_id::<T>(id)?;
            let mut items = self.items.write();
            if items.remove(id).is_none() {
                return Err(Error::not_found(describe::<T>(id)));
            }
            metrics::adjust_entity_count(T::KIND, -1);
            Ok(())
        })
    }

    /// One page of entities matching `predicate`, in `(updated_at DESC, id ASC)` order
    ///
    /// A `None` predicate matches everything. Cancellation is checked every
    /// `scan_batch` items while snapshotting and while locating the cursor;
    /// a cancelled call returns the cancellation error and no items.
    pub fn list(&self, ctx: &Context, predicate: Option<Predicate<'_, T>>, options: &ListOptions) -> Result<ListResult<T>> {
        self.observe("list", || {
            ctx.check()?;
            let cursor = self.codec.decode(&options.cursor)?;
            let limit = self.limits.normalize(options.limit);

            let mut snapshot = self.snapshot(ctx, predicate)?;
            snapshot.sort_by(list_order);

            let start = if cursor.is_zero() {
                0
            } else {
                self.position_after(ctx, &snapshot, &cursor)?
            };
            if start >= snapshot.len() {
                return Ok(ListResult::empty());
            }

            let end = start.saturating_add(limit).min(snapshot.len());
            let next_cursor = if end < snapshot.len() {
                let last = &snapshot[end - 1];
                self.codec.encode(&Cursor::after(last.updated_at(), last.id()))?
            } else {
                String::new()
            };

            snapshot.truncate(end);
            snapshot.drain(..start);
            Ok(ListResult {
                items: snapshot,
                next_cursor,
            })
        })
    }

    /// Clone every matching entity under the read lock
    fn snapshot(&self, ctx: &Context, predicate: Option<Predicate<'_, T>>) -> Result<Vec<T>> {
        let items = self.items.read();
        let mut out = Vec::new();
        for (scanned, entity) in items.values().enumerate() {
            if scanned > 0 && scanned % self.scan_batch == 0 {
                ctx.check()?;
            }
            if predicate.map_or(true, |p| p(entity)) {
                out.push(entity.clone());
            }
        }
        Ok(out)
    }

    /// Index of the first sorted entity strictly after `cursor`
    fn position_after(&self, ctx: &Context, sorted: &[T], cursor: &Cursor) -> Result<usize> {
        for (i, entity) in sorted.iter().enumerate() {
            if i > 0 && i % self.scan_batch == 0 {
                ctx.check()?;
            }
            if is_after_cursor(entity, cursor) {
                return Ok(i);
            }
        }
        Ok(sorted.len())
    }

    fn observe<R>(&self, op: &'static str, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let result = f();
        metrics::record_operation(T::KIND, op, result.as_ref().err().map(Error::kind));
        result
    }
}

impl<T: Entity> Default for GenericStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn describe<T: Entity>(id: &str) -> String {
    format!("{} {}", T::KIND, id)
}

fn require_id<T: Entity>(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::invalid_argument(format!("{} id must not be empty", T::KIND)));
    }
    Ok(())
}

fn validate<T: Entity>(entity: &T) -> Result<()> {
    require_id::<T>(entity.id())?;
    if entity.updated_at().is_zero() {
        return Err(Error::invalid_argument(format!(
            "{} {} must have a non-zero updated_at",
            T::KIND,
            entity.id()
        )));
    }
    Ok(())
}
