use serde::{Deserialize, Deserializer, Serialize, de::Error};
use smol_str::SmolStr;
use std::fmt;
use std::{ops::Deref, str::FromStr};

/// Error produced when an item identifier cannot be derived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum ItemIdError {
    /// The identifier was empty or whitespace.
    #[error("item identifier is empty")]
    #[diagnostic(code(lookout::item_id::empty))]
    Empty,
    /// The link had no path segment to take the identifier from.
    #[error("link `{0}` has no trailing path segment")]
    #[diagnostic(
        code(lookout::item_id::link),
        help("item links look like https://imgur.com/gallery/<id>")
    )]
    NoSegment(String),
}

/// Identifier of one item in a gallery.
///
/// Opaque and stable for a viewing session. Two items with the same
/// identifier share a single moderation request.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Hash)]
#[serde(transparent)]
#[repr(transparent)]
pub struct ItemId(SmolStr);

impl ItemId {
    /// Creates an identifier from a raw id string.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ItemIdError> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            Err(ItemIdError::Empty)
        } else {
            Ok(Self(SmolStr::new(id)))
        }
    }

    /// Creates an identifier from a `'static` string without copying.
    pub fn new_static(id: &'static str) -> Result<Self, ItemIdError> {
        if id.trim().is_empty() {
            Err(ItemIdError::Empty)
        } else {
            Ok(Self(SmolStr::new_static(id)))
        }
    }

    /// Derives the identifier from an item link.
    ///
    /// The identifier is the last non-empty path segment, so
    /// `https://imgur.com/gallery/abc123` and `/gallery/abc123/` both give
    /// `abc123`. Query strings and fragments are ignored.
    pub fn from_link(link: impl AsRef<str>) -> Result<Self, ItemIdError> {
        let link = link.as_ref();
        let path = link.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/')
            .find(|segment| !segment.trim().is_empty())
            .ok_or_else(|| ItemIdError::NoSegment(link.to_string()))
            .and_then(|segment| Self::new(segment))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = SmolStr::deserialize(deserializer)?;
        Self::new(value).map_err(D::Error::custom)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ItemId> for SmolStr {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl From<ItemId> for String {
    fn from(value: ItemId) -> Self {
        value.0.to_string()
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Deref for ItemId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}
