use std::sync::Arc;
use std::time::Duration;

use lookout_common::{ItemId, ModerationResult};

use super::cache::ModerationCache;
use super::handle::{HandleState, ModerationHandle};
use super::types::{Generation, ModerationOptions, Resolution, RetryState, ScanTicket};
use crate::host::{Gallery, ModerationTransport, Notifier, Presenter, Severity};

/// Drives the moderation check for the item the user is viewing.
///
/// One call to [`run`](Self::run) walks `Start → AwaitVerdict → Resolved`
/// or `Failed`, retrying failed attempts after a fixed backoff until the
/// attempt budget runs out. Nothing is applied to the presentation unless
/// the scan is still the latest and the item is still current.
pub struct Resolver<T> {
    cache: Arc<ModerationCache>,
    transport: Arc<T>,
    gallery: Arc<dyn Gallery>,
    presenter: Arc<dyn Presenter>,
    notifier: Arc<dyn Notifier>,
    generation: Generation,
    options: Arc<ModerationOptions>,
}

enum Failure {
    NoCurrentItem,
    Request(ItemId),
}

impl<T> Resolver<T>
where
    T: ModerationTransport + Send + Sync + 'static,
{
    /// Create a resolver sharing `cache` and `generation` with its caller.
    pub fn new(
        cache: Arc<ModerationCache>,
        transport: Arc<T>,
        gallery: Arc<dyn Gallery>,
        presenter: Arc<dyn Presenter>,
        notifier: Arc<dyn Notifier>,
        generation: Generation,
        options: Arc<ModerationOptions>,
    ) -> Self {
        Self {
            cache,
            transport,
            gallery,
            presenter,
            notifier,
            generation,
            options,
        }
    }

    /// The `Start` step: handle for the current item, issuing a request if
    /// none exists yet.
    ///
    /// A cached request that had already failed before this lookup (usually
    /// a prefetch) is retired and reissued here, so it never counts against
    /// the current item's attempts.
    pub fn begin(&self) -> Option<(usize, ModerationHandle)> {
        let (index, item) = self.gallery.current_item()?;
        let request = || ModerationHandle::request(&self.transport, &item);
        let (mut handle, created) = self.cache.get_or_create_tracked(&item, request);
        if !created
            && handle.state() == HandleState::Rejected
            && self.cache.retire_rejected(&item, &handle)
        {
            tracing::debug!(item = %item, "reissuing request that failed before it was awaited");
            handle = self.cache.get_or_create(&item, request);
        }
        Some((index, handle))
    }

    /// Resolve the current item for the scan holding `ticket`.
    ///
    /// `on_start` runs once, with the current index, as soon as the first
    /// attempt has a handle for the item.
    pub async fn run<F>(&self, ticket: ScanTicket, mut retry: RetryState, on_start: F) -> Resolution
    where
        F: FnOnce(usize),
    {
        let mut on_start = Some(on_start);

        loop {
            let failure = match self.begin() {
                Some((index, handle)) => {
                    if let Some(start) = on_start.take() {
                        start(index);
                    }
                    let item = handle.item().clone();
                    match handle.await_result().await {
                        Ok(result) => {
                            if !self.is_current(ticket, &item) {
                                tracing::debug!(item = %item, "discarding stale verdict");
                                return Resolution::Stale;
                            }
                            return self.apply(&item, &result);
                        }
                        Err(error) => {
                            tracing::warn!(
                                item = %item,
                                attempt = retry.attempt(),
                                max_attempts = retry.max_attempts(),
                                status = ?error.status(),
                                error = %error,
                                "failed to acquire moderation verdict"
                            );
                            self.cache.retire_rejected(&item, &handle);
                            Failure::Request(item)
                        }
                    }
                }
                None => {
                    tracing::debug!(
                        attempt = retry.attempt(),
                        "no current item to moderate yet"
                    );
                    Failure::NoCurrentItem
                }
            };

            if !self.generation.is_latest(ticket) {
                return Resolution::Stale;
            }

            if !retry.can_retry() {
                self.give_up(&failure, retry.attempt());
                return Resolution::Exhausted {
                    attempts: retry.attempt(),
                };
            }

            sleep(self.options.retry_backoff).await;
            if !self.generation.is_latest(ticket) {
                tracing::debug!("scan superseded during retry backoff");
                return Resolution::Stale;
            }
            retry.advance();
        }
    }

    /// Apply a verdict for `item`: skip it, or hide its flagged images.
    pub fn apply(&self, item: &ItemId, result: &ModerationResult) -> Resolution {
        if result.unrecoverable {
            tracing::info!(item = %item, "skipping unrecoverable item");
            self.presenter.advance_to_next_item();
            self.notifier.notify(&self.options.skip_message, Severity::Info);
            Resolution::Skipped
        } else {
            let count = self.mark(result);
            if count > 0 {
                tracing::info!(item = %item, count, "hid unrecoverable images");
            }
            Resolution::Marked { count }
        }
    }

    /// Hide or replace every image the verdict flags. Returns how many.
    pub fn mark(&self, result: &ModerationResult) -> usize {
        let mut count = 0;
        for image in result.unrecoverable_images() {
            match &image.replacement {
                Some(replacement) => self.presenter.replace_element(&image.id, replacement),
                None => self.presenter.mark_unrecoverable(&image.id),
            }
            count += 1;
        }
        count
    }

    /// Whether `ticket` is the latest scan and `item` is still on screen.
    pub fn is_current(&self, ticket: ScanTicket, item: &ItemId) -> bool {
        self.generation.is_latest(ticket)
            && self
                .gallery
                .current_item()
                .is_some_and(|(_, current)| &current == item)
    }

    fn give_up(&self, failure: &Failure, attempts: u32) {
        match failure {
            Failure::Request(item) => tracing::error!(
                item = %item,
                attempts,
                "giving up on moderation verdict, leaving item unmoderated"
            ),
            Failure::NoCurrentItem => tracing::error!(
                attempts,
                "giving up on moderation, no current item was found"
            ),
        }
        if self.options.notify_errors {
            self.notifier
                .notify(&self.options.error_message, Severity::Error);
        }
    }
}

async fn sleep(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

impl<T> std::fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cache", &self.cache)
            .field("generation", &self.generation.current())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
