use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lookout_common::ItemId;

use super::handle::{HandleState, IntoModerationHandle, ModerationHandle};

/// Session-wide map from item to its moderation request.
///
/// Holds at most one live handle per item: a request is issued the first
/// time an item is asked for and every later lookup shares it. Entries are
/// never replaced; the only removal is [`retire_rejected`](Self::retire_rejected),
/// which lets a failed request be retried.
#[derive(Default)]
pub struct ModerationCache {
    entries: Mutex<HashMap<ItemId, ModerationHandle>>,
}

impl ModerationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<ItemId, ModerationHandle>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the handle for `id`, creating it with `factory` if absent.
    ///
    /// The presence check, the factory call and the insert happen under one
    /// lock, so `factory` runs at most once per live entry even when callers
    /// race on different threads. `factory` must not call back into the cache.
    pub fn get_or_create<F, S>(&self, id: &ItemId, factory: F) -> ModerationHandle
    where
        F: FnOnce() -> S,
        S: IntoModerationHandle,
    {
        self.get_or_create_tracked(id, factory).0
    }

    /// Like [`get_or_create`](Self::get_or_create), also reporting whether a
    /// new request was issued.
    pub(crate) fn get_or_create_tracked<F, S>(
        &self,
        id: &ItemId,
        factory: F,
    ) -> (ModerationHandle, bool)
    where
        F: FnOnce() -> S,
        S: IntoModerationHandle,
    {
        let mut entries = self.entries();
        if let Some(existing) = entries.get(id) {
            tracing::trace!(item = %id, state = ?existing.state(), "moderation cache hit");
            return (existing.clone(), false);
        }

        let handle = factory().into_handle(id);
        entries.insert(id.clone(), handle.clone());
        tracing::debug!(item = %id, "moderation request issued");
        (handle, true)
    }

    /// Handle for `id`, if one exists.
    pub fn get(&self, id: &ItemId) -> Option<ModerationHandle> {
        self.entries().get(id).cloned()
    }

    /// Whether a handle exists for `id`.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.entries().contains_key(id)
    }

    /// Number of items with a handle.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Remove `handle` from the entry for `id` if it is still that entry and
    /// it was rejected. Returns whether anything was removed.
    ///
    /// Pending and fulfilled handles are never removed, and a handle that
    /// has already been superseded by a newer request is left alone.
    pub fn retire_rejected(&self, id: &ItemId, handle: &ModerationHandle) -> bool {
        let mut entries = self.entries();
        let retire = entries
            .get(id)
            .is_some_and(|current| current.ptr_eq(handle) && current.state() == HandleState::Rejected);
        if retire {
            entries.remove(id);
            tracing::debug!(item = %id, "retired rejected moderation request");
        }
        retire
    }
}

impl fmt::Debug for ModerationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModerationCache")
            .field("entries", &self.len())
            .finish()
    }
}
