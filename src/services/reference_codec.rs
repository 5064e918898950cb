//! Encodes "container + ordered chunk locators" into one persisted string and
//! decodes it back.
//!
//! Wire format: `{container_url}|{locator_1},{locator_2},...`. The string is
//! free-form user-editable text once stored, so decoding degrades instead of
//! failing.

use crate::models::{
    container::{ChunkLocator, RemoteContainer},
    reference::{MediaReference, ParsedReference},
};

const CONTAINER_SEPARATOR: &str = "|";
const LOCATOR_SEPARATOR: &str = ",";

/// Encode a container and its locators. An empty list encodes as `"{url}|"`.
pub fn encode(container: &RemoteContainer, locators: &[ChunkLocator]) -> MediaReference {
    encode_urls(&container.url, locators.iter().map(|l| l.url.as_str()))
}

/// Encode from plain URLs.
pub fn encode_urls<'a>(
    container_url: &str,
    locators: impl IntoIterator<Item = &'a str>,
) -> MediaReference {
    let joined = locators
        .into_iter()
        .collect::<Vec<_>>()
        .join(LOCATOR_SEPARATOR);
    MediaReference::from_encoded(format!(
        "{}{}{}",
        container_url, CONTAINER_SEPARATOR, joined
    ))
}

/// Decode a stored reference. Never fails.
///
/// Splits on the first `|`. Blank locator entries are dropped. Input without
/// a `|` is a bare link: `composite == false`, no locators.
pub fn decode(reference: &str) -> ParsedReference {
    let trimmed = reference.trim();
    match trimmed.split_once(CONTAINER_SEPARATOR) {
        Some((container, rest)) => ParsedReference {
            container_url: container.trim().to_string(),
            locators: rest
                .split(LOCATOR_SEPARATOR)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            composite: true,
        },
        None => ParsedReference {
            container_url: trimmed.to_string(),
            locators: Vec::new(),
            composite: false,
        },
    }
}
