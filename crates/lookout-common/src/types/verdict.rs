use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};
use smol_str::SmolStr;

/// The moderation server's verdict on one gallery item.
///
/// A missing or `null` flag is read as `false`, and fields the server sends
/// beyond these (titles, OCR text, links) are ignored.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// Whether the whole item should be skipped
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub unrecoverable: bool,
    /// Per-image verdicts
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub images: Vec<ImageVerdict>,
}

/// Verdict for one image (sub-element) of an item.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVerdict {
    /// Identifier of the rendered sub-element
    pub id: SmolStr,
    /// Whether this image should be hidden
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub unrecoverable: bool,
    /// Optional replacement content for the image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
}

impl ModerationResult {
    /// A verdict that leaves the item and all of its images untouched.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Looks up the verdict for an image by exact identifier.
    pub fn image(&self, id: &str) -> Option<&ImageVerdict> {
        self.images.iter().find(|image| image.id.as_str() == id)
    }

    /// Images whose verdict says they should be hidden.
    pub fn unrecoverable_images(&self) -> impl Iterator<Item = &ImageVerdict> {
        self.images.iter().filter(|image| image.unrecoverable)
    }

    /// Whether the verdict asks for any presentation change at all.
    pub fn is_moderated(&self) -> bool {
        self.unrecoverable || self.images.iter().any(|image| image.unrecoverable)
    }
}
