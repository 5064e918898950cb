//! Represents the raw media input and the bounded chunks cut from it.

use bytes::Bytes;
use serde::Serialize;
use std::ops::Range;

/// A recorded or supplied media object, held fully in memory.
///
/// Owned by the caller until handed to the chunker. Never persisted.
#[derive(Clone, Debug)]
pub struct BinaryObject {
    /// Raw payload bytes.
    pub data: Bytes,

    /// Declared MIME type (e.g. `video/webm;codecs=vp8,opus`).
    pub media_type: String,
}

impl BinaryObject {
    pub fn new(data: impl Into<Bytes>, media_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            media_type: media_type.into(),
        }
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One bounded slice of a [`BinaryObject`].
///
/// `data` is a zero-copy view of `range` within the parent payload.
#[derive(Clone, Debug, Serialize)]
pub struct Chunk {
    /// 0-based position among siblings.
    pub index: usize,

    /// Number of chunks cut from the parent object.
    pub count: usize,

    /// Byte range into the parent payload.
    pub range: Range<usize>,

    /// Derived filename (`recording.webm` or `recording-part2of3.webm`).
    pub filename: String,

    #[serde(skip)]
    pub data: Bytes,
}

impl Chunk {
    /// Length of this slice in bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A named payload ready to be committed to a remote container.
///
/// Either produced from a [`Chunk`] or supplied already chunked by a caller.
#[derive(Clone, Debug)]
pub struct UploadPart {
    pub filename: String,
    pub data: Bytes,
}

impl UploadPart {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl From<Chunk> for UploadPart {
    fn from(chunk: Chunk) -> Self {
        Self {
            filename: chunk.filename,
            data: chunk.data,
        }
    }
}
