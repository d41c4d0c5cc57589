mod item;
mod query;
mod verdict;

pub use item::{ItemId, ItemIdError};
pub use query::PostQuery;
pub use verdict::{ImageVerdict, ModerationResult};
