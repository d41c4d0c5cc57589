use std::sync::Arc;

use tracing::Instrument;

use super::cache::ModerationCache;
use super::handle::HandleState;
use super::prefetch::Prefetcher;
use super::resolver::Resolver;
use super::types::{Generation, ModerationOptions, RetryState, ScanOutcome};
use crate::host::{Gallery, ModerationTransport, Notifier, Presenter};

/// Entry point for host events.
///
/// The host calls [`on_navigation_change`](Self::on_navigation_change) when
/// the user moves to another item and
/// [`on_visible_subset_change`](Self::on_visible_subset_change) when more of
/// the current item's sub-elements are rendered. Clones share the same
/// session cache and generation counter.
pub struct ScanOrchestrator<T> {
    cache: Arc<ModerationCache>,
    gallery: Arc<dyn Gallery>,
    generation: Generation,
    options: Arc<ModerationOptions>,
    resolver: Arc<Resolver<T>>,
    prefetcher: Arc<Prefetcher<T>>,
}

impl<T> Clone for ScanOrchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            gallery: self.gallery.clone(),
            generation: self.generation.clone(),
            options: self.options.clone(),
            resolver: self.resolver.clone(),
            prefetcher: self.prefetcher.clone(),
        }
    }
}

impl<T> ScanOrchestrator<T>
where
    T: ModerationTransport + Send + Sync + 'static,
{
    /// Wire a session around `transport` and the host collaborators.
    pub fn new(
        transport: T,
        gallery: Arc<dyn Gallery>,
        presenter: Arc<dyn Presenter>,
        notifier: Arc<dyn Notifier>,
        options: ModerationOptions,
    ) -> Self {
        let cache = Arc::new(ModerationCache::new());
        let transport = Arc::new(transport);
        let generation = Generation::default();
        let options = Arc::new(options);

        let resolver = Arc::new(Resolver::new(
            cache.clone(),
            transport.clone(),
            gallery.clone(),
            presenter,
            notifier,
            generation.clone(),
            options.clone(),
        ));
        let prefetcher = Arc::new(Prefetcher::new(cache.clone(), transport));

        Self {
            cache,
            gallery,
            generation,
            options,
            resolver,
            prefetcher,
        }
    }

    /// Session cache of moderation requests.
    pub fn cache(&self) -> &ModerationCache {
        &self.cache
    }

    /// Options this session was built with.
    pub fn options(&self) -> &ModerationOptions {
        &self.options
    }

    /// Handle a navigation signal.
    ///
    /// Waits for the debounce, then resolves the current item and prefetches
    /// the ones after it. If another signal arrives first, this one returns
    /// [`ScanOutcome::Superseded`] without doing anything.
    pub async fn on_navigation_change(&self) -> ScanOutcome {
        let ticket = self.generation.advance();

        if !self.options.debounce.is_zero() {
            tokio::time::sleep(self.options.debounce).await;
        }
        if !self.generation.is_latest(ticket) {
            tracing::trace!(generation = ticket.get(), "navigation scan superseded");
            return ScanOutcome::Superseded;
        }

        let retry = RetryState::new(self.options.max_attempts);
        let lookahead = self.options.lookahead;
        let span = tracing::debug_span!("resolve_item", generation = ticket.get());

        let resolution = self
            .resolver
            .run(ticket, retry, |index| {
                self.prefetcher.prefetch(&*self.gallery, index, lookahead);
            })
            .instrument(span)
            .await;

        ScanOutcome::Resolved(resolution)
    }

    /// Re-apply the current item's image verdicts to newly rendered content.
    ///
    /// Only acts when the current item's verdict is already in the cache;
    /// never issues a request or skips an item. Returns how many sub-elements
    /// were hidden or replaced.
    pub fn on_visible_subset_change(&self) -> usize {
        let Some((_, item)) = self.gallery.current_item() else {
            return 0;
        };
        let Some(handle) = self.cache.get(&item) else {
            return 0;
        };
        if handle.state() != HandleState::Fulfilled {
            return 0;
        }
        match handle.settled() {
            Some(Ok(result)) => self.resolver.mark(&result),
            _ => 0,
        }
    }
}

impl<T> std::fmt::Debug for ScanOrchestrator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOrchestrator")
            .field("cache", &self.cache)
            .field("generation", &self.generation.current())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
