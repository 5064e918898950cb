//! Represents the persisted media reference and the shapes it decodes into.

use serde::Serialize;

/// The persisted `container_url|locator_1,locator_2,...` string.
///
/// Immutable once produced; replacing it means producing a new one.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct MediaReference(String);

impl MediaReference {
    pub(crate) fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Result of decoding a reference string.
///
/// Decoding never fails: text without a `|` comes back as a bare link
/// (`composite == false`) with no locators.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ParsedReference {
    /// Left side of the first `|`, or the whole trimmed input for a bare link.
    pub container_url: String,

    /// Ordered chunk locators from the right side of the first `|`.
    pub locators: Vec<String>,

    /// Whether the input had the composite `container|locators` shape.
    pub composite: bool,
}

impl ParsedReference {
    /// First locator, where playback starts.
    pub fn primary(&self) -> Option<&str> {
        self.locators.first().map(String::as_str)
    }
}

/// Renderer family a playable link belongs to.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    ChunkedHost,
    Youtube,
    Vimeo,
    Loom,
    GoogleDrive,
    Direct,
}

/// What a playback consumer should render for a stored string.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Playback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,

    pub is_valid: bool,

    /// Locator to hand to the renderer (first part for chunked references).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_locator: Option<String>,

    /// Every part, in order; only set for chunked references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_locators: Option<Vec<String>>,

    /// "View original" link for chunked references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_url: Option<String>,
}

impl Playback {
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Number of parts the consumer should announce (0 when not chunked).
    pub fn part_count(&self) -> usize {
        self.all_locators.as_ref().map_or(0, Vec::len)
    }
}
