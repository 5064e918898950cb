//! Scratch workspace for one upload attempt.
//!
//! Each attempt owns a directory `{root}/upload-{uuid}` holding the raw chunk
//! files (`chunks/`) and the clone of the remote container (`mirror/`). The
//! directory is removed by [`ScratchWorkspace::release`] or, failing that,
//! when the guard is dropped (early return, error, panic or cancellation).
//! Removal on drop runs on the blocking pool when a runtime is available.

use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

const CHUNKS_DIR: &str = "chunks";
const MIRROR_DIR: &str = "mirror";

#[derive(Debug)]
pub struct ScratchWorkspace {
    root: PathBuf,
    released: bool,
}

impl ScratchWorkspace {
    /// Create a fresh, uniquely named workspace beneath `parent`.
    ///
    /// The mirror directory is not created; cloning creates it.
    pub async fn acquire(parent: &Path) -> io::Result<Self> {
        fs::create_dir_all(parent).await?;
        let root = parent.join(format!("upload-{}", Uuid::new_v4()));
        fs::create_dir(&root).await?;
        // Guard exists from here on, so a failure below still cleans up.
        let workspace = Self {
            root,
            released: false,
        };
        fs::create_dir(workspace.chunks_dir()).await?;
        debug!("acquired scratch workspace {}", workspace.root.display());
        Ok(workspace)
    }

    pub fn chunks_dir(&self) -> PathBuf {
        self.root.join(CHUNKS_DIR)
    }

    pub fn mirror_dir(&self) -> PathBuf {
        self.root.join(MIRROR_DIR)
    }

    /// Remove the workspace from disk.
    pub async fn release(mut self) -> io::Result<()> {
        self.released = true;
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                debug!("released scratch workspace {}", self.root.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                // Drop gets one more try.
                self.released = false;
                Err(err)
            }
        }
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let root = std::mem::take(&mut self.root);
        // Inside the runtime the removal must not stall a worker thread.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_blocking(&root));
            }
            Err(_) => remove_blocking(&root),
        }
    }
}

fn remove_blocking(root: &Path) {
    match std::fs::remove_dir_all(root) {
        Ok(()) => debug!("removed scratch workspace {} on drop", root.display()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!(
            "failed to remove scratch workspace {}: {}",
            root.display(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn wait_until_gone(path: &Path) -> bool {
        for _ in 0..200 {
            if !path.exists() {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        false
    }

    #[tokio::test]
    async fn workspaces_are_unique_and_released() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchWorkspace::acquire(root.path()).await.unwrap();
        let b = ScratchWorkspace::acquire(root.path()).await.unwrap();
        assert_ne!(a.root, b.root);
        assert!(a.chunks_dir().is_dir());
        assert!(!a.mirror_dir().exists());

        let a_path = a.root.clone();
        a.release().await.unwrap();
        assert!(!a_path.exists());

        let b_path = b.root.clone();
        drop(b);
        assert!(wait_until_gone(&b_path).await);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn drop_removes_populated_workspace() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let ws = ScratchWorkspace::acquire(root.path()).await.unwrap();
            std::fs::write(ws.chunks_dir().join("a.webm"), b"data").unwrap();
            std::fs::create_dir_all(ws.mirror_dir().join(".git")).unwrap();
            ws.root.clone()
        };
        assert!(wait_until_gone(&path).await);
    }

    #[tokio::test]
    async fn cancelled_attempt_releases_its_workspace() {
        let root = tempfile::tempdir().unwrap();
        let parent = root.path().to_path_buf();
        let task = tokio::spawn(async move {
            let ws = ScratchWorkspace::acquire(&parent).await.unwrap();
            std::fs::write(ws.chunks_dir().join("a.webm"), vec![0u8; 64 * 1024]).unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            drop(ws);
        });
        for _ in 0..200 {
            if std::fs::read_dir(root.path()).unwrap().count() == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let path = std::fs::read_dir(root.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());
        assert!(wait_until_gone(&path).await);
    }

    #[test]
    fn drop_outside_a_runtime_removes_synchronously() {
        let root = tempfile::tempdir().unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let ws = rt
            .block_on(ScratchWorkspace::acquire(root.path()))
            .unwrap();
        drop(rt);

        let path = ws.root.clone();
        drop(ws);
        assert!(!path.exists());
    }
}
