use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

use super::ItemId;

/// Request body sent to the moderation server for one item.
///
/// `images` is sent empty by clients; the server fetches the item itself.
/// `datetime` is the request time in unix milliseconds, as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostQuery {
    /// Item being checked
    pub id: ItemId,
    /// Image identifiers already known to the client
    #[serde(default)]
    pub images: Vec<SmolStr>,
    /// Public link to the item
    pub post_url: String,
    /// Request timestamp, unix milliseconds
    pub datetime: String,
}

impl PostQuery {
    /// Builds the query for `id`, linking it under `gallery_base`.
    ///
    /// `gallery_base` should end with a slash (`https://imgur.com/gallery/`)
    /// so the id is appended rather than replacing the last segment.
    pub fn for_item(id: &ItemId, gallery_base: &Url) -> Result<Self, url::ParseError> {
        let post_url = gallery_base.join(id.as_str())?;
        Ok(Self {
            id: id.clone(),
            images: Vec::new(),
            post_url: post_url.into(),
            datetime: chrono::Utc::now().timestamp_millis().to_string(),
        })
    }
}
