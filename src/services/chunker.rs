//! src/services/chunker.rs
//!
//! Splits an in-memory media object into ordered, bounded chunks with
//! derived filenames. Pure: no I/O, no shared state, deterministic for a
//! given (object, base name, ceiling).

use crate::models::media::{BinaryObject, Chunk};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("chunk ceiling must be greater than zero")]
    ZeroCeiling,
    #[error("base name `{0}` is not a valid filename stem")]
    InvalidBaseName(String),
    #[error("media type `{0}` has no subtype")]
    InvalidMediaType(String),
}

/// Cut `object` into `max(1, ceil(size / ceiling))` chunks.
///
/// An empty object yields exactly one zero-length chunk. A single chunk is
/// named `{base_name}.{ext}`; otherwise `{base_name}-part{n}of{count}.{ext}`
/// with `n` starting at 1.
pub fn chunk(
    object: &BinaryObject,
    base_name: &str,
    ceiling: usize,
) -> Result<Vec<Chunk>, ChunkingError> {
    if ceiling == 0 {
        return Err(ChunkingError::ZeroCeiling);
    }
    ensure_base_name(base_name)?;
    let ext = extension_for(&object.media_type)?;

    let size = object.size();
    let count = size.div_ceil(ceiling).max(1);

    let chunks = (0..count)
        .map(|index| {
            let start = index * ceiling;
            let end = (start + ceiling).min(size);
            Chunk {
                index,
                count,
                range: start..end,
                filename: part_filename(base_name, ext, index, count),
                data: object.data.slice(start..end),
            }
        })
        .collect();

    Ok(chunks)
}

/// Derive a file extension from a MIME type.
///
/// Takes the subtype and drops any `;` parameters, so
/// `video/webm;codecs=vp8,opus` becomes `webm`.
pub fn extension_for(media_type: &str) -> Result<&str, ChunkingError> {
    let subtype = media_type
        .split_once('/')
        .map(|(_, rest)| rest)
        .ok_or_else(|| ChunkingError::InvalidMediaType(media_type.to_string()))?;
    let ext = subtype.split(';').next().unwrap_or("").trim();
    if ext.is_empty() || ext.contains(['/', '\\', '.']) {
        return Err(ChunkingError::InvalidMediaType(media_type.to_string()));
    }
    Ok(ext)
}

/// Build the filename for chunk `index` of `count`.
pub fn part_filename(base_name: &str, ext: &str, index: usize, count: usize) -> String {
    if count == 1 {
        format!("{}.{}", base_name, ext)
    } else {
        format!("{}-part{}of{}.{}", base_name, index + 1, count, ext)
    }
}

/// Parse the `(part, of)` pair out of a `-partXofY` filename, 1-based.
pub fn part_position(filename: &str) -> Option<(usize, usize)> {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    let (_, suffix) = stem.rsplit_once("-part")?;
    let (part, of) = suffix.split_once("of")?;
    let part = part.parse::<usize>().ok()?;
    let of = of.parse::<usize>().ok()?;
    (part >= 1 && part <= of).then_some((part, of))
}

fn ensure_base_name(base_name: &str) -> Result<(), ChunkingError> {
    let valid = !base_name.is_empty()
        && base_name != "."
        && base_name != ".."
        && !base_name
            .chars()
            .any(|c| c.is_control() || matches!(c, '/' | '\\'));
    if valid {
        Ok(())
    } else {
        Err(ChunkingError::InvalidBaseName(base_name.to_string()))
    }
}
