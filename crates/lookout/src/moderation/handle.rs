use std::fmt;
use std::future::Future;
use std::sync::Arc;

use lookout_common::error::TransportError;
use lookout_common::{ItemId, ModerationResult, RequestError, RequestResult};
use tokio::sync::watch;

use crate::host::ModerationTransport;

/// Terminal value of a moderation request, shared by every consumer.
pub type Settlement = Result<Arc<ModerationResult>, Arc<RequestError>>;

/// Observable state of a [`ModerationHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// The request has not settled yet
    Pending,
    /// A verdict was received
    Fulfilled,
    /// The request failed
    Rejected,
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Settled(Settlement),
}

struct HandleInner {
    item: ItemId,
    slot: watch::Sender<Slot>,
}

/// A one-shot moderation request whose state can be read at any time.
///
/// The request is spawned when the handle is created and runs whether or
/// not anyone awaits it. Clones share the same request; reading the state
/// never re-issues it.
#[derive(Clone)]
pub struct ModerationHandle {
    inner: Arc<HandleInner>,
}

impl ModerationHandle {
    /// Spawn `request` on the current tokio runtime and track its outcome.
    ///
    /// Must be called from within a runtime.
    pub fn spawn<F>(item: ItemId, request: F) -> Self
    where
        F: Future<Output = RequestResult<ModerationResult>> + Send + 'static,
    {
        let (slot, _) = watch::channel(Slot::Pending);
        let inner = Arc::new(HandleInner { item, slot });
        let producer = inner.clone();

        tokio::spawn(async move {
            let settled = match request.await {
                Ok(result) => {
                    tracing::debug!(
                        item = %producer.item,
                        unrecoverable = result.unrecoverable,
                        images = result.images.len(),
                        "moderation verdict received"
                    );
                    Ok(Arc::new(result))
                }
                Err(error) => {
                    tracing::warn!(item = %producer.item, error = %error, "moderation request failed");
                    Err(Arc::new(error))
                }
            };
            producer.slot.send_replace(Slot::Settled(settled));
        });

        Self { inner }
    }

    /// Issue a request for `item` through `transport`.
    pub fn request<T>(transport: &Arc<T>, item: &ItemId) -> Self
    where
        T: ModerationTransport + Send + Sync + 'static,
    {
        let transport = transport.clone();
        let id = item.clone();
        Self::spawn(item.clone(), async move { transport.check_item(&id).await })
    }

    /// A handle that is already fulfilled with `result`.
    pub fn fulfilled(item: ItemId, result: ModerationResult) -> Self {
        Self::settled_with(item, Ok(Arc::new(result)))
    }

    /// A handle that is already rejected with `error`.
    pub fn rejected(item: ItemId, error: RequestError) -> Self {
        Self::settled_with(item, Err(Arc::new(error)))
    }

    fn settled_with(item: ItemId, settlement: Settlement) -> Self {
        let (slot, _) = watch::channel(Slot::Settled(settlement));
        Self {
            inner: Arc::new(HandleInner { item, slot }),
        }
    }

    /// Item this handle was created for.
    pub fn item(&self) -> &ItemId {
        &self.inner.item
    }

    /// Current state. Never blocks.
    pub fn state(&self) -> HandleState {
        match &*self.inner.slot.borrow() {
            Slot::Pending => HandleState::Pending,
            Slot::Settled(Ok(_)) => HandleState::Fulfilled,
            Slot::Settled(Err(_)) => HandleState::Rejected,
        }
    }

    /// Whether the request is still in flight.
    pub fn is_pending(&self) -> bool {
        self.state() == HandleState::Pending
    }

    /// The outcome, if the request has settled.
    pub fn settled(&self) -> Option<Settlement> {
        match &*self.inner.slot.borrow() {
            Slot::Pending => None,
            Slot::Settled(settlement) => Some(settlement.clone()),
        }
    }

    /// Wait for the request to settle and return its outcome.
    pub async fn await_result(&self) -> Settlement {
        let mut rx = self.inner.slot.subscribe();
        match rx.wait_for(|slot| matches!(slot, Slot::Settled(_))).await {
            Ok(slot) => match &*slot {
                Slot::Settled(settlement) => settlement.clone(),
                Slot::Pending => Err(dropped()),
            },
            Err(_) => Err(dropped()),
        }
    }

    /// Whether both handles track the same request.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

fn dropped() -> Arc<RequestError> {
    Arc::new(RequestError::Transport(TransportError::Other(
        "moderation request dropped before settling".into(),
    )))
}

impl fmt::Debug for ModerationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModerationHandle")
            .field("item", &self.inner.item)
            .field("state", &self.state())
            .finish()
    }
}

/// Conversion into a [`ModerationHandle`].
///
/// Request futures are spawned; an existing handle is returned unchanged,
/// so wrapping twice never issues a second request.
pub trait IntoModerationHandle {
    /// Wrap `self` as the handle for `item`.
    fn into_handle(self, item: &ItemId) -> ModerationHandle;
}

impl IntoModerationHandle for ModerationHandle {
    fn into_handle(self, _item: &ItemId) -> ModerationHandle {
        self
    }
}

impl<F> IntoModerationHandle for F
where
    F: Future<Output = RequestResult<ModerationResult>> + Send + 'static,
{
    fn into_handle(self, item: &ItemId) -> ModerationHandle {
        ModerationHandle::spawn(item.clone(), self)
    }
}
