use std::sync::Arc;

use super::cache::ModerationCache;
use super::handle::ModerationHandle;
use crate::host::{Gallery, ModerationTransport};

/// Seeds the cache with requests for the items after the current one.
///
/// Prefetching never waits on the requests it issues. A failed prefetch is
/// only logged by the request itself and is retried, if at all, once the
/// item becomes current.
pub struct Prefetcher<T> {
    cache: Arc<ModerationCache>,
    transport: Arc<T>,
}

impl<T> Prefetcher<T>
where
    T: ModerationTransport + Send + Sync + 'static,
{
    /// Create a prefetcher issuing requests through `transport`.
    pub fn new(cache: Arc<ModerationCache>, transport: Arc<T>) -> Self {
        Self { cache, transport }
    }

    /// Request verdicts for the `window` items after `current_index`.
    ///
    /// Offsets past the end of the gallery are skipped. Returns how many new
    /// requests were issued; items already in the cache are left alone.
    pub fn prefetch(&self, gallery: &dyn Gallery, current_index: usize, window: usize) -> usize {
        let len = gallery.len();
        let mut issued = 0;

        for offset in 1..=window {
            let index = match current_index.checked_add(offset) {
                Some(index) if index < len => index,
                _ => break,
            };
            let Some(item) = gallery.item_at(index) else {
                continue;
            };

            let (_, created) = self
                .cache
                .get_or_create_tracked(&item, || ModerationHandle::request(&self.transport, &item));
            if created {
                issued += 1;
            }
        }

        tracing::debug!(current_index, window, issued, "prefetched upcoming items");
        issued
    }
}

impl<T> std::fmt::Debug for Prefetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefetcher")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
