//! Common types for the lookout moderation client
//!
//! This crate holds the pieces shared between the moderation core and any
//! transport talking to a moderation server: item identifiers, the request
//! and verdict wire types, the error taxonomy, and a minimal HTTP client
//! abstraction.

#![warn(missing_docs)]
pub use smol_str;
pub use url;

pub mod error;
/// HTTP client abstraction used by lookout crates.
pub mod http_client;
/// Item identifiers and moderation wire types.
pub mod types;

pub use error::{RequestError, RequestResult};
pub use types::{ImageVerdict, ItemId, ItemIdError, ModerationResult, PostQuery};
