//! Traits for the host environment the moderation core runs in.
//!
//! The core never touches the rendered gallery directly. It reads the
//! navigation sequence through [`Gallery`], asks the moderation server for
//! verdicts through [`ModerationTransport`], and reports decisions through
//! [`Presenter`] and [`Notifier`]. Presentation calls may be repeated for the
//! same item, so implementations must be idempotent.

use std::future::Future;

use lookout_common::{ItemId, ModerationResult, RequestResult};

/// Read access to the navigable item sequence.
pub trait Gallery: Send + Sync {
    /// Index of the item the user is currently viewing, if the host knows it yet.
    fn current_index(&self) -> Option<usize>;

    /// Identifier of the item at `index`, if there is one.
    fn item_at(&self, index: usize) -> Option<ItemId>;

    /// Number of items in the sequence.
    fn len(&self) -> usize;

    /// Whether the sequence is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index and identifier of the current item.
    fn current_item(&self) -> Option<(usize, ItemId)> {
        let index = self.current_index()?;
        self.item_at(index).map(|item| (index, item))
    }
}

/// Issues moderation requests for single items.
///
/// The request payload and wire format belong to the implementation; see
/// [`HttpTransport`](crate::client::HttpTransport) for the HTTP one.
#[trait_variant::make(Send)]
pub trait ModerationTransport {
    /// Ask the moderation service for a verdict on `item`.
    fn check_item(
        &self,
        item: &ItemId,
    ) -> impl Future<Output = RequestResult<ModerationResult>>;
}

/// Applies moderation decisions to the rendered gallery.
pub trait Presenter: Send + Sync {
    /// Hide (blur) the sub-element with this identifier.
    fn mark_unrecoverable(&self, element_id: &str);

    /// Swap the sub-element for replacement content.
    ///
    /// Hosts that cannot replace content fall back to hiding it.
    fn replace_element(&self, element_id: &str, _replacement: &str) {
        self.mark_unrecoverable(element_id);
    }

    /// Navigate past the current item.
    fn advance_to_next_item(&self);
}

/// How prominent a notification should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Routine information, e.g. an item was skipped
    Info,
    /// Something went wrong
    Error,
}

/// Shows short, transient messages to the user.
pub trait Notifier: Send + Sync {
    /// Display `message` with the given severity.
    fn notify(&self, message: &str, severity: Severity);
}

/// A [`Notifier`] that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}
