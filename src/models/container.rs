//! Represents a remote container and the files committed to it.

use serde::{Deserialize, Serialize};

/// A server-side container on the remote object host.
///
/// Created once per upload attempt and never deleted by this service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RemoteContainer {
    /// Opaque identifier assigned by the host.
    pub id: String,

    /// Human-facing URL of the container.
    pub url: String,

    /// Push-capable clone URL (without credentials).
    pub push_url: String,

    /// Description supplied at creation time.
    pub description: String,
}

/// One entry of a container listing as reported by the host.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContainerFile {
    pub filename: String,

    /// Size in bytes.
    pub size: u64,

    /// Directly fetchable URL of the file's current content.
    pub raw_url: String,
}

/// Durable, fetchable address of one committed chunk.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChunkLocator {
    pub filename: String,
    pub url: String,
    pub size: u64,
}

impl From<ContainerFile> for ChunkLocator {
    fn from(file: ContainerFile) -> Self {
        Self {
            filename: file.filename,
            url: file.raw_url,
            size: file.size,
        }
    }
}
