//! Remote container abstraction.
//!
//! The upload orchestrator talks to the remote object host only through
//! [`RemoteContainerClient`], so the concrete transport (REST API plus a
//! `git` subprocess today) can be swapped or faked.

#[cfg(test)]
pub mod fake;
pub mod gist;

use crate::models::container::{ContainerFile, RemoteContainer};
use async_trait::async_trait;
use std::{io, path::Path, process::ExitStatus};
use thiserror::Error;

/// Remote host operation errors
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("host returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected host response: {0}")]
    InvalidResponse(String),

    #[error("`git {command}` exited with {status}: {stderr}")]
    Git {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Operations the upload orchestrator needs from the remote object host.
///
/// `mirror` paths always point inside a scratch workspace owned by the
/// caller. Implementations never delete containers.
#[async_trait]
pub trait RemoteContainerClient: Send + Sync {
    /// Create a container holding one initial text file.
    async fn create(
        &self,
        description: &str,
        initial_file: &str,
        initial_content: &str,
    ) -> RemoteResult<RemoteContainer>;

    /// Clone `container` into `mirror` (which must not exist yet) and prepare
    /// it for pushing.
    async fn mirror_into(&self, container: &RemoteContainer, mirror: &Path) -> RemoteResult<()>;

    /// Stage everything in `mirror` and record one change labelled `message`.
    async fn commit(&self, mirror: &Path, message: &str) -> RemoteResult<()>;

    /// Push the recorded changes in `mirror` to the container.
    async fn push(&self, mirror: &Path) -> RemoteResult<()>;

    /// Current file listing of `container`, in host order.
    async fn list(&self, container: &RemoteContainer) -> RemoteResult<Vec<ContainerFile>>;
}
