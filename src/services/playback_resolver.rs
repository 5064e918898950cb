//! Classifies a stored reference or pasted link into something a player can
//! render. Pure: no network probing.
//!
//! Order of classification (first match wins):
//! 1. composite chunked reference on the configured container host,
//! 2. known external platforms (YouTube, Vimeo, Loom, Google Drive),
//! 3. a direct link to a media file,
//! 4. otherwise invalid.

use crate::{
    models::reference::{Platform, Playback},
    services::reference_codec,
};
use reqwest::Url;

/// File extensions treated as directly playable media.
pub const MEDIA_EXTENSIONS: [&str; 13] = [
    "webm", "mp4", "m4a", "mp3", "ogg", "oga", "opus", "wav", "mov", "mkv", "weba", "aac",
    "flac",
];

/// Returns true if `name` ends with a recognised media extension.
pub fn has_media_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && MEDIA_EXTENSIONS
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    })
}

#[derive(Clone, Debug)]
pub struct PlaybackResolver {
    container_host: String,
}

impl PlaybackResolver {
    /// `container_host` is the hostname composite references must point at
    /// (e.g. `gist.github.com`).
    pub fn new(container_host: impl Into<String>) -> Self {
        Self {
            container_host: container_host.into().to_ascii_lowercase(),
        }
    }

    /// Resolve arbitrary text. Never panics; unknown input is invalid.
    pub fn resolve(&self, input: &str) -> Playback {
        let input = input.trim();
        if input.is_empty() {
            return Playback::invalid();
        }

        if let Some(playback) = self.resolve_composite(input) {
            return playback;
        }
        // Pipe-delimited text that isn't ours is never a plain link.
        if input.contains('|') {
            return Playback::invalid();
        }

        let Some(url) = parse_web_url(input) else {
            return Playback::invalid();
        };

        external_embed(&url)
            .or_else(|| direct_media(&url))
            .unwrap_or_else(Playback::invalid)
    }

    fn resolve_composite(&self, input: &str) -> Option<Playback> {
        let parsed = reference_codec::decode(input);
        if !parsed.composite {
            return None;
        }
        let container = parse_web_url(&parsed.container_url)?;
        if !host_matches(&container, &self.container_host) {
            return None;
        }

        // A container with no parts has nothing to play.
        let embed_locator = parsed.primary()?.to_string();
        Some(Playback {
            platform: Some(Platform::ChunkedHost),
            is_valid: true,
            embed_locator: Some(embed_locator),
            container_url: Some(parsed.container_url),
            all_locators: Some(parsed.locators),
        })
    }
}

fn parse_web_url(input: &str) -> Option<Url> {
    let url = Url::parse(input).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    Some(url)
}

fn host_matches(url: &Url, expected: &str) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == expected || host.strip_prefix("www.") == Some(expected)
    })
}

fn embed(platform: Platform, locator: String) -> Playback {
    Playback {
        platform: Some(platform),
        is_valid: true,
        embed_locator: Some(locator),
        ..Playback::default()
    }
}

fn external_embed(url: &Url) -> Option<Playback> {
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match host {
        "youtube.com" | "m.youtube.com" | "youtube-nocookie.com" => {
            let id = match segments.as_slice() {
                ["watch", ..] => url
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                ["embed" | "shorts" | "live", id, ..] => Some((*id).to_string()),
                _ => None,
            }?;
            valid_id(&id).then(|| {
                embed(
                    Platform::Youtube,
                    format!("https://www.youtube.com/embed/{}", id),
                )
            })
        }
        "youtu.be" => {
            let id = segments.first()?;
            valid_id(id).then(|| {
                embed(
                    Platform::Youtube,
                    format!("https://www.youtube.com/embed/{}", id),
                )
            })
        }
        "vimeo.com" | "player.vimeo.com" => {
            let id = segments
                .iter()
                .find(|seg| seg.chars().all(|c| c.is_ascii_digit()))?;
            Some(embed(
                Platform::Vimeo,
                format!("https://player.vimeo.com/video/{}", id),
            ))
        }
        "loom.com" => match segments.as_slice() {
            ["share" | "embed", id, ..] if valid_id(id) => Some(embed(
                Platform::Loom,
                format!("https://www.loom.com/embed/{}", id),
            )),
            _ => None,
        },
        "drive.google.com" => {
            let id = match segments.as_slice() {
                ["file", "d", id, ..] => Some((*id).to_string()),
                ["open"] | ["uc"] => url
                    .query_pairs()
                    .find(|(k, _)| k == "id")
                    .map(|(_, v)| v.into_owned()),
                _ => None,
            }?;
            valid_id(&id).then(|| {
                embed(
                    Platform::GoogleDrive,
                    format!("https://drive.google.com/file/d/{}/preview", id),
                )
            })
        }
        _ => None,
    }
}

fn direct_media(url: &Url) -> Option<Playback> {
    let last = url.path_segments()?.next_back()?;
    has_media_extension(last).then(|| embed(Platform::Direct, url.to_string()))
}

fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}
