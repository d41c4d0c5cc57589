//! # Lookout
//!
//! Lookahead content moderation for navigable galleries.
//!
//! Lookout checks each item a user navigates to against a remote moderation
//! service and tells the host page what to do with it: skip the item, or hide
//! some of its images. Verdicts for the next few items are fetched ahead of
//! time, each item is requested at most once per session, and the current
//! item is retried a bounded number of times before it is left untouched.
//!
//! The host supplies the page through the traits in [`host`]. An HTTP
//! transport for the moderation server lives in [`client`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lookout::client::HttpTransport;
//! use lookout::host::SilentNotifier;
//! use lookout::moderation::{ModerationOptions, ScanOrchestrator};
//!
//! # async fn run(gallery: Arc<dyn lookout::host::Gallery>, page: Arc<dyn lookout::host::Presenter>) -> miette::Result<()> {
//! let transport = HttpTransport::with_endpoint("http://localhost:3030/".parse().unwrap());
//! let session = ScanOrchestrator::new(
//!     transport,
//!     gallery,
//!     page,
//!     Arc::new(SilentNotifier),
//!     ModerationOptions::new().lookahead(3).build(),
//! );
//!
//! // call on every navigation
//! let outcome = session.on_navigation_change().await;
//! println!("{outcome:?}");
//!
//! // call when more of the current item has rendered
//! session.on_visible_subset_change();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod host;
pub mod moderation;

pub use lookout_common::*;
pub use moderation::{ModerationOptions, Resolution, ScanOrchestrator, ScanOutcome};
