//! In-memory remote host for tests.
//!
//! Commits snapshot the new files in the mirror, pushes publish them, and
//! listing returns what was published (optionally reversed). Failures and
//! hangs can be injected per stage and index.

use super::{RemoteContainerClient, RemoteError, RemoteResult};
use crate::{
    models::container::{ContainerFile, RemoteContainer},
    services::upload_service::UploadStage,
};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

#[derive(Default)]
pub struct FakeHost {
    state: Mutex<FakeState>,
    fail_at: Option<(UploadStage, usize)>,
    hang_at: Option<UploadStage>,
    reverse_listing: bool,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    pending: Vec<ContainerFile>,
    remote: Vec<ContainerFile>,
    commits: usize,
    pushes: usize,
    mirror: Option<PathBuf>,
}

impl FakeHost {
    pub fn failing(stage: UploadStage, index: usize) -> Self {
        Self {
            fail_at: Some((stage, index)),
            ..Self::default()
        }
    }

    pub fn reversed() -> Self {
        Self {
            reverse_listing: true,
            ..Self::default()
        }
    }

    pub fn hanging(stage: UploadStage) -> Self {
        Self {
            hang_at: Some(stage),
            ..Self::default()
        }
    }

    /// Every client call so far, commits tagged with their message.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Published filenames in host order.
    pub fn remote_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.remote.iter().map(|f| f.filename.clone()).collect()
    }

    pub fn mirror(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().mirror.clone()
    }

    pub fn file(name: &str, size: u64) -> ContainerFile {
        ContainerFile {
            filename: name.to_string(),
            size,
            raw_url: format!("https://host/c1/raw/{}", name),
        }
    }

    async fn gate(&self, stage: UploadStage, index: usize) -> RemoteResult<()> {
        if self.hang_at == Some(stage) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_at == Some((stage, index)) {
            return Err(RemoteError::Api {
                status: 502,
                message: format!("injected {} failure", stage),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteContainerClient for FakeHost {
    async fn create(
        &self,
        description: &str,
        initial_file: &str,
        initial_content: &str,
    ) -> RemoteResult<RemoteContainer> {
        self.state.lock().unwrap().calls.push("create".into());
        self.gate(UploadStage::ContainerCreate, 0).await?;
        self.state
            .lock()
            .unwrap()
            .remote
            .push(Self::file(initial_file, initial_content.len() as u64));
        Ok(RemoteContainer {
            id: "c1".into(),
            url: "https://host/c1".into(),
            push_url: "https://host/c1.git".into(),
            description: description.into(),
        })
    }

    async fn mirror_into(&self, _container: &RemoteContainer, mirror: &Path) -> RemoteResult<()> {
        self.state.lock().unwrap().calls.push("clone".into());
        self.gate(UploadStage::Clone, 0).await?;
        std::fs::create_dir_all(mirror)?;
        self.state.lock().unwrap().mirror = Some(mirror.to_path_buf());
        Ok(())
    }

    async fn commit(&self, mirror: &Path, message: &str) -> RemoteResult<()> {
        let index = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("commit:{}", message));
            state.commits
        };
        self.gate(UploadStage::Commit, index).await?;
        let mut state = self.state.lock().unwrap();
        state.commits += 1;
        for entry in std::fs::read_dir(mirror)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let known = state
                .remote
                .iter()
                .chain(state.pending.iter())
                .any(|f| f.filename == name);
            if !known {
                let size = entry.metadata()?.len();
                state.pending.push(Self::file(&name, size));
            }
        }
        Ok(())
    }

    async fn push(&self, _mirror: &Path) -> RemoteResult<()> {
        let index = {
            let mut state = self.state.lock().unwrap();
            state.calls.push("push".into());
            state.pushes
        };
        self.gate(UploadStage::Push, index).await?;
        let mut state = self.state.lock().unwrap();
        state.pushes += 1;
        let pending = std::mem::take(&mut state.pending);
        state.remote.extend(pending);
        Ok(())
    }

    async fn list(&self, _container: &RemoteContainer) -> RemoteResult<Vec<ContainerFile>> {
        self.state.lock().unwrap().calls.push("list".into());
        self.gate(UploadStage::List, 0).await?;
        let mut files = self.state.lock().unwrap().remote.clone();
        if self.reverse_listing {
            files.reverse();
        }
        Ok(files)
    }
}
