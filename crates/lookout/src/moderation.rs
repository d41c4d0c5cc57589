//! Pre-fetching, deduplicated moderation for a navigable gallery
//!
//! This module decides, for each item the user navigates to, whether to skip
//! it entirely or hide some of its images. Verdicts come from an external
//! moderation service through a [`ModerationTransport`](crate::host::ModerationTransport)
//! and are applied through the host's [`Presenter`](crate::host::Presenter).
//!
//! # Core Concepts
//!
//! - **Handles**: one spawned request per item, whose state can be read
//!   without blocking (see [`ModerationHandle`])
//! - **Cache**: at most one live handle per item for the whole session
//!   (see [`ModerationCache`])
//! - **Lookahead**: requests for the next few items are issued as soon as the
//!   current item's request exists, so their verdicts are usually ready by
//!   the time the user gets there
//! - **Generations**: every navigation signal supersedes the previous one;
//!   verdicts for a scan that is no longer the latest are discarded
//! - **Fail-open**: if the current item cannot be checked after a few
//!   attempts it is left as it is
//!
//! # Example
//!
//! ```ignore
//! # use std::sync::Arc;
//! # use lookout::moderation::*;
//! # use lookout::client::HttpTransport;
//! # async fn example(gallery: Arc<dyn lookout::host::Gallery>, presenter: Arc<dyn lookout::host::Presenter>) {
//! let session = ScanOrchestrator::new(
//!     HttpTransport::with_endpoint("http://localhost:3030/".parse().unwrap()),
//!     gallery,
//!     presenter,
//!     Arc::new(lookout::host::SilentNotifier),
//!     ModerationOptions::default(),
//! );
//! match session.on_navigation_change().await {
//!     ScanOutcome::Resolved(Resolution::Skipped) => { /* moved past the item */ }
//!     _ => {}
//! }
//! # }
//! ```

mod cache;
mod handle;
mod orchestrator;
mod prefetch;
mod resolver;
mod types;


pub use cache::ModerationCache;
pub use handle::{HandleState, IntoModerationHandle, ModerationHandle, Settlement};
pub use orchestrator::ScanOrchestrator;
pub use prefetch::Prefetcher;
pub use resolver::Resolver;
pub use types::{Generation, ModerationOptions, Resolution, RetryState, ScanOutcome, ScanTicket};
