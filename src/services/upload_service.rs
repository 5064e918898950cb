//! src/services/upload_service.rs
//!
//! UploadService: publishes a media object to a size-constrained remote host
//! as a sequence of small files inside one freshly created container.
//!
//! One attempt walks a fixed sequence of states:
//! `Idle → Creating → Cloning → (Committing(i) → Pushing(i))×N → Listing → Done`,
//! dropping into `Failed(stage)` on the first error. Nothing is retried; a
//! failed attempt may leave a partially populated container behind, which is
//! logged and left for inspection. The scratch workspace is released on
//! every exit path.

use crate::{
    models::{
        container::{ChunkLocator, ContainerFile, RemoteContainer},
        media::{BinaryObject, UploadPart},
        reference::MediaReference,
    },
    services::{
        chunker::{self, ChunkingError},
        playback_resolver::has_media_extension,
        reference_codec,
        remote::{RemoteContainerClient, RemoteError, RemoteResult},
        workspace::ScratchWorkspace,
    },
};
use serde::Serialize;
use std::{
    collections::HashSet,
    fmt,
    future::Future,
    io,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Name of the placeholder file every container is created with.
pub const MANIFEST_FILENAME: &str = "manifest.md";

/// Base name used for chunk filenames when the caller gives none.
pub const DEFAULT_BASE_NAME: &str = "recording";

/// Remote step an upload attempt failed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStage {
    ContainerCreate,
    Clone,
    Commit,
    Push,
    List,
}

impl UploadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStage::ContainerCreate => "container-create",
            UploadStage::Clone => "clone",
            UploadStage::Commit => "commit",
            UploadStage::Push => "push",
            UploadStage::List => "list",
        }
    }
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of an attempt in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Creating,
    Cloning,
    Committing(usize),
    Pushing(usize),
    Listing,
    Done,
    Failed(UploadStage),
}

impl UploadState {
    /// Stage a failure in this state is attributed to.
    pub fn stage(&self) -> Option<UploadStage> {
        match self {
            UploadState::Creating => Some(UploadStage::ContainerCreate),
            UploadState::Cloning => Some(UploadStage::Clone),
            UploadState::Committing(_) => Some(UploadStage::Commit),
            UploadState::Pushing(_) => Some(UploadStage::Push),
            UploadState::Listing => Some(UploadStage::List),
            UploadState::Idle | UploadState::Done | UploadState::Failed(_) => None,
        }
    }

    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            UploadState::Committing(i) | UploadState::Pushing(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadState::Idle => f.write_str("idle"),
            UploadState::Creating => f.write_str("creating"),
            UploadState::Cloning => f.write_str("cloning"),
            UploadState::Committing(i) => write!(f, "committing({})", i),
            UploadState::Pushing(i) => write!(f, "pushing({})", i),
            UploadState::Listing => f.write_str("listing"),
            UploadState::Done => f.write_str("done"),
            UploadState::Failed(stage) => write!(f, "failed({})", stage),
        }
    }
}

/// Why a remote stage failed.
#[derive(Debug, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("staging chunk file: {0}")]
    Io(#[from] io::Error),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("no parts to upload")]
    NoParts,
    #[error("media object is empty")]
    EmptyObject,
    #[error("part `{name}` rejected: {reason}")]
    InvalidPart { name: String, reason: &'static str },
    #[error(transparent)]
    Chunking(#[from] ChunkingError),
    #[error("scratch workspace unavailable: {0}")]
    Workspace(#[source] io::Error),
    #[error("upload failed at {stage}{}: {reason}", part_label(.chunk_index, .chunk_count))]
    Stage {
        stage: UploadStage,
        chunk_index: Option<usize>,
        chunk_count: usize,
        /// Set once the container exists; it may hold some parts already.
        container_url: Option<String>,
        #[source]
        reason: StageFailure,
    },
}

impl UploadError {
    pub fn stage(&self) -> Option<UploadStage> {
        match self {
            UploadError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            UploadError::Stage { chunk_index, .. } => *chunk_index,
            _ => None,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(
            self,
            UploadError::Stage {
                reason: StageFailure::TimedOut(_),
                ..
            }
        )
    }
}

fn part_label(chunk_index: &Option<usize>, chunk_count: &usize) -> String {
    chunk_index
        .map(|i| format!(" (part {} of {})", i + 1, chunk_count))
        .unwrap_or_default()
}

pub type UploadResult<T> = Result<T, UploadError>;

/// Tunables for one upload attempt.
#[derive(Clone, Debug)]
pub struct UploadSettings {
    /// Largest chunk pushed in one change, in bytes.
    pub chunk_ceiling: usize,
    /// Pause between consecutive pushes.
    pub chunk_delay: Duration,
    /// Deadline applied to each remote step on its own.
    pub step_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_ceiling: 7 * 1024 * 1024,
            chunk_delay: Duration::from_secs(2),
            step_timeout: Duration::from_secs(120),
        }
    }
}

/// Outcome of a successful attempt.
#[derive(Clone, Debug)]
pub struct UploadReceipt {
    pub container: RemoteContainer,
    /// Committed chunks in part order.
    pub files: Vec<ChunkLocator>,
    pub reference: MediaReference,
}

#[derive(Clone)]
pub struct UploadService {
    client: Arc<dyn RemoteContainerClient>,
    scratch_root: PathBuf,
    settings: UploadSettings,
}

impl UploadService {
    pub fn new(
        client: Arc<dyn RemoteContainerClient>,
        scratch_root: impl Into<PathBuf>,
        settings: UploadSettings,
    ) -> Self {
        Self {
            client,
            scratch_root: scratch_root.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Chunk `object` and upload the chunks.
    ///
    /// Empty objects are rejected before any remote call.
    pub async fn upload(
        &self,
        object: &BinaryObject,
        base_name: &str,
        description: &str,
    ) -> UploadResult<UploadReceipt> {
        if object.is_empty() {
            return Err(UploadError::EmptyObject);
        }
        let chunks = chunker::chunk(object, base_name, self.settings.chunk_ceiling)?;
        debug!(
            "split {} bytes of {} into {} chunk(s)",
            object.size(),
            object.media_type,
            chunks.len()
        );
        let parts = chunks.into_iter().map(UploadPart::from).collect();
        self.upload_parts(parts, description).await
    }

    /// Upload already-chunked parts, in the given order.
    ///
    /// Zero parts, unsafe or duplicate filenames are rejected before any
    /// remote call.
    pub async fn upload_parts(
        &self,
        parts: Vec<UploadPart>,
        description: &str,
    ) -> UploadResult<UploadReceipt> {
        validate_parts(&parts)?;

        let mut attempt = Attempt::new(parts.len());
        let timeout = self.settings.step_timeout;

        attempt.enter(UploadState::Creating);
        let manifest = render_manifest(description, &parts);
        let container = attempt
            .step(
                timeout,
                self.client
                    .create(description, MANIFEST_FILENAME, &manifest),
            )
            .await?;
        attempt.container_url = Some(container.url.clone());
        info!(
            "created container {} for {} part(s)",
            container.url,
            parts.len()
        );

        let workspace = ScratchWorkspace::acquire(&self.scratch_root)
            .await
            .map_err(|err| {
                error!("no scratch workspace for {}, container left empty: {}", container.url, err);
                UploadError::Workspace(err)
            })?;
        let outcome = self
            .push_parts(&workspace, &container, &parts, &mut attempt)
            .await;
        if let Err(err) = workspace.release().await {
            warn!("failed to release scratch workspace: {}", err);
        }

        match outcome {
            Ok(files) => {
                attempt.enter(UploadState::Done);
                let reference = reference_codec::encode(&container, &files);
                info!(
                    "uploaded {} part(s) to {}",
                    files.len(),
                    container.url
                );
                Ok(UploadReceipt {
                    container,
                    files,
                    reference,
                })
            }
            Err(err) => {
                error!(
                    "upload to {} aborted, container left as-is: {}",
                    container.url, err
                );
                Err(err)
            }
        }
    }

    /// Clone, then commit and push each part in order, then list.
    async fn push_parts(
        &self,
        workspace: &ScratchWorkspace,
        container: &RemoteContainer,
        parts: &[UploadPart],
        attempt: &mut Attempt,
    ) -> UploadResult<Vec<ChunkLocator>> {
        let timeout = self.settings.step_timeout;
        let mirror = workspace.mirror_dir();
        let staging = workspace.chunks_dir();

        attempt.enter(UploadState::Cloning);
        attempt
            .step(timeout, self.client.mirror_into(container, &mirror))
            .await?;

        let count = parts.len();
        for (index, part) in parts.iter().enumerate() {
            attempt.enter(UploadState::Committing(index));
            let staged = staging.join(&part.filename);
            fs::write(&staged, &part.data)
                .await
                .map_err(|err| attempt.fail(err.into()))?;
            fs::copy(&staged, mirror.join(&part.filename))
                .await
                .map_err(|err| attempt.fail(err.into()))?;
            let message = format!("Add part {} of {}: {}", index + 1, count, part.filename);
            attempt
                .step(timeout, self.client.commit(&mirror, &message))
                .await?;

            attempt.enter(UploadState::Pushing(index));
            attempt.step(timeout, self.client.push(&mirror)).await?;
            info!(
                "pushed part {}/{} {} ({} bytes)",
                index + 1,
                count,
                part.filename,
                part.size()
            );

            if index + 1 < count && !self.settings.chunk_delay.is_zero() {
                tokio::time::sleep(self.settings.chunk_delay).await;
            }
        }

        attempt.enter(UploadState::Listing);
        let listing = attempt.step(timeout, self.client.list(container)).await?;
        Ok(select_locators(listing))
    }
}

/// Bookkeeping for one attempt's state machine.
struct Attempt {
    state: UploadState,
    chunk_count: usize,
    container_url: Option<String>,
}

impl Attempt {
    fn new(chunk_count: usize) -> Self {
        Self {
            state: UploadState::Idle,
            chunk_count,
            container_url: None,
        }
    }

    fn enter(&mut self, next: UploadState) {
        debug!("upload state {} -> {}", self.state, next);
        self.state = next;
    }

    /// Record a failure in the current state and build the matching error.
    fn fail(&mut self, reason: StageFailure) -> UploadError {
        // Only active states run remote steps.
        let stage = self.state.stage().unwrap_or(UploadStage::ContainerCreate);
        let chunk_index = self.state.chunk_index();
        self.enter(UploadState::Failed(stage));
        UploadError::Stage {
            stage,
            chunk_index,
            chunk_count: self.chunk_count,
            container_url: self.container_url.clone(),
            reason,
        }
    }

    /// Run one remote step under its own deadline.
    async fn step<T>(
        &mut self,
        timeout: Duration,
        fut: impl Future<Output = RemoteResult<T>>,
    ) -> UploadResult<T> {
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(self.fail(StageFailure::Remote(err))),
            Err(_) => Err(self.fail(StageFailure::TimedOut(timeout))),
        }
    }
}

fn validate_parts(parts: &[UploadPart]) -> UploadResult<()> {
    if parts.is_empty() {
        return Err(UploadError::NoParts);
    }
    let mut seen = HashSet::new();
    for part in parts {
        let reject = |reason| UploadError::InvalidPart {
            name: part.filename.clone(),
            reason,
        };
        let name = part.filename.as_str();
        if name.is_empty() || name.starts_with('.') {
            return Err(reject("filename must not be empty or hidden"));
        }
        if name.contains("..")
            || name
                .chars()
                .any(|c| c.is_control() || matches!(c, '/' | '\\'))
        {
            return Err(reject("filename must be a plain file name"));
        }
        if name.eq_ignore_ascii_case(MANIFEST_FILENAME) {
            return Err(reject("filename is reserved"));
        }
        if !has_media_extension(name) {
            return Err(reject("unsupported media extension"));
        }
        if !seen.insert(name) {
            return Err(reject("duplicate filename"));
        }
    }
    Ok(())
}

/// Markdown table of the intended parts, used as the container's first file.
fn render_manifest(description: &str, parts: &[UploadPart]) -> String {
    let title = match description.trim() {
        "" => "Media upload",
        other => other,
    };
    let total: usize = parts.iter().map(UploadPart::size).sum();
    let mut out = format!(
        "# {}\n\n{} part(s), {} bytes in total.\n\n| # | file | bytes | md5 |\n|---|------|-------|-----|\n",
        title,
        parts.len(),
        total
    );
    for (i, part) in parts.iter().enumerate() {
        out.push_str(&format!(
            "| {} | {} | {} | {:x} |\n",
            i + 1,
            part.filename,
            part.size(),
            md5::compute(&part.data)
        ));
    }
    out
}

/// Keep media files, drop the manifest, and order by part number when every
/// entry carries one. Otherwise the host's order is kept.
fn select_locators(listing: Vec<ContainerFile>) -> Vec<ChunkLocator> {
    let mut media: Vec<ContainerFile> = listing
        .into_iter()
        .filter(|f| f.filename != MANIFEST_FILENAME && has_media_extension(&f.filename))
        .collect();
    let positions: Option<Vec<usize>> = media
        .iter()
        .map(|f| chunker::part_position(&f.filename).map(|(part, _)| part))
        .collect();
    if let Some(positions) = positions {
        let mut indexed: Vec<_> = positions.into_iter().zip(media).collect();
        indexed.sort_by_key(|(part, _)| *part);
        media = indexed.into_iter().map(|(_, f)| f).collect();
    }
    media.into_iter().map(ChunkLocator::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::remote::fake::FakeHost;
    use std::{path::Path, time::Instant};

    const KB: usize = 1024;

    fn settings() -> UploadSettings {
        UploadSettings {
            chunk_ceiling: 7 * KB,
            chunk_delay: Duration::ZERO,
            step_timeout: Duration::from_secs(5),
        }
    }

    fn service(host: &Arc<FakeHost>, root: &Path, settings: UploadSettings) -> UploadService {
        UploadService::new(host.clone(), root.join("scratch"), settings)
    }

    fn webm(size: usize) -> BinaryObject {
        BinaryObject::new(vec![7u8; size], "video/webm;codecs=vp8,opus")
    }

    fn scratch_is_empty(root: &Path) -> bool {
        match std::fs::read_dir(root.join("scratch")) {
            Ok(entries) => entries.count() == 0,
            Err(err) => err.kind() == io::ErrorKind::NotFound,
        }
    }

    #[tokio::test]
    async fn single_small_object_is_one_push() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::default());
        let svc = service(&host, tmp.path(), settings());

        let receipt = svc
            .upload(&webm(2 * KB), DEFAULT_BASE_NAME, "Role intro")
            .await
            .unwrap();

        assert_eq!(
            receipt.reference.as_str(),
            "https://host/c1|https://host/c1/raw/recording.webm"
        );
        assert_eq!(receipt.files.len(), 1);
        assert_eq!(receipt.files[0].size, 2 * KB as u64);
        assert_eq!(
            host.calls(),
            [
                "create",
                "clone",
                "commit:Add part 1 of 1: recording.webm",
                "push",
                "list"
            ]
        );
        assert!(scratch_is_empty(tmp.path()));
    }

    #[tokio::test]
    async fn multi_part_object_pushes_in_order_with_pacing() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::reversed());
        let delay = Duration::from_millis(25);
        let svc = service(
            &host,
            tmp.path(),
            UploadSettings {
                chunk_delay: delay,
                ..settings()
            },
        );

        let started = Instant::now();
        let receipt = svc
            .upload(&webm(20 * KB), DEFAULT_BASE_NAME, "Role intro")
            .await
            .unwrap();
        assert!(started.elapsed() >= delay * 2);

        let calls = host.calls();
        let pushes: Vec<_> = calls
            .iter()
            .filter(|c| c.starts_with("commit:") || *c == "push")
            .map(String::as_str)
            .collect();
        assert_eq!(
            pushes,
            [
                "commit:Add part 1 of 3: recording-part1of3.webm",
                "push",
                "commit:Add part 2 of 3: recording-part2of3.webm",
                "push",
                "commit:Add part 3 of 3: recording-part3of3.webm",
                "push",
            ]
        );

        let names: Vec<_> = receipt.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(
            names,
            [
                "recording-part1of3.webm",
                "recording-part2of3.webm",
                "recording-part3of3.webm"
            ]
        );
        assert_eq!(
            receipt.reference.as_str(),
            "https://host/c1|https://host/c1/raw/recording-part1of3.webm,\
             https://host/c1/raw/recording-part2of3.webm,\
             https://host/c1/raw/recording-part3of3.webm"
        );
        assert!(scratch_is_empty(tmp.path()));
    }

    #[tokio::test]
    async fn push_failure_mid_upload_keeps_earlier_parts_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::failing(UploadStage::Push, 1));
        let svc = service(&host, tmp.path(), settings());

        let err = svc
            .upload(&webm(20 * KB), DEFAULT_BASE_NAME, "Role intro")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(UploadStage::Push));
        assert_eq!(err.chunk_index(), Some(1));
        assert!(err.to_string().contains("(part 2 of 3)"));
        match &err {
            UploadError::Stage { container_url, .. } => {
                assert_eq!(container_url.as_deref(), Some("https://host/c1"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        assert_eq!(
            host.remote_names(),
            ["manifest.md", "recording-part1of3.webm"]
        );
        let calls = host.calls();
        assert_eq!(calls.iter().filter(|c| *c == "push").count(), 2);
        assert!(!calls.iter().any(|c| c.contains("part 3 of 3")));
        assert!(!calls.contains(&"list".to_string()));

        let mirror = host.mirror().unwrap();
        assert!(!mirror.exists());
        assert!(scratch_is_empty(tmp.path()));
    }

    #[tokio::test]
    async fn every_stage_failure_is_tagged_and_cleaned_up() {
        let cases = [
            (UploadStage::ContainerCreate, 0, None),
            (UploadStage::Clone, 0, None),
            (UploadStage::Commit, 0, Some(0)),
            (UploadStage::Push, 0, Some(0)),
            (UploadStage::List, 0, None),
        ];
        for (stage, index, expected_chunk) in cases {
            let tmp = tempfile::tempdir().unwrap();
            let host = Arc::new(FakeHost::failing(stage, index));
            let svc = service(&host, tmp.path(), settings());

            let err = svc
                .upload(&webm(10 * KB), DEFAULT_BASE_NAME, "Role intro")
                .await
                .unwrap_err();
            assert_eq!(err.stage(), Some(stage), "{}", stage);
            assert_eq!(err.chunk_index(), expected_chunk, "{}", stage);
            assert!(!err.timed_out());
            assert!(scratch_is_empty(tmp.path()), "{}", stage);
        }
    }

    #[tokio::test]
    async fn container_create_failure_does_no_further_work() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::failing(UploadStage::ContainerCreate, 0));
        let svc = service(&host, tmp.path(), settings());

        let _ = svc
            .upload(&webm(KB), DEFAULT_BASE_NAME, "Role intro")
            .await
            .unwrap_err();
        assert_eq!(host.calls(), ["create"]);
    }

    #[tokio::test]
    async fn stalled_step_times_out_at_its_stage() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::hanging(UploadStage::Push));
        let svc = service(
            &host,
            tmp.path(),
            UploadSettings {
                step_timeout: Duration::from_millis(50),
                ..settings()
            },
        );

        let err = svc
            .upload(&webm(KB), DEFAULT_BASE_NAME, "Role intro")
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(UploadStage::Push));
        assert!(err.timed_out());
        assert!(scratch_is_empty(tmp.path()));
    }

    #[tokio::test]
    async fn rejects_before_any_remote_call() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::default());
        let svc = service(&host, tmp.path(), settings());

        assert!(matches!(
            svc.upload_parts(Vec::new(), "x").await,
            Err(UploadError::NoParts)
        ));
        // The chunker still yields one zero-length chunk; the service refuses it.
        assert!(matches!(
            svc.upload(&webm(0), DEFAULT_BASE_NAME, "x").await,
            Err(UploadError::EmptyObject)
        ));
        assert!(matches!(
            svc.upload(&webm(10), "", "x").await,
            Err(UploadError::Chunking(ChunkingError::InvalidBaseName(_)))
        ));
        for parts in [
            vec![UploadPart::new("../a.webm", vec![1])],
            vec![UploadPart::new("manifest.md", vec![1])],
            vec![UploadPart::new("notes.txt", vec![1])],
            vec![
                UploadPart::new("a.webm", vec![1]),
                UploadPart::new("a.webm", vec![2]),
            ],
        ] {
            assert!(matches!(
                svc.upload_parts(parts, "x").await,
                Err(UploadError::InvalidPart { .. })
            ));
        }
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn pre_chunked_parts_keep_their_names() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::default());
        let svc = service(&host, tmp.path(), settings());

        let receipt = svc
            .upload_parts(
                vec![
                    UploadPart::new("clip-part1of2.mp4", vec![1u8; 10]),
                    UploadPart::new("clip-part2of2.mp4", vec![2u8; 4]),
                ],
                "Screen capture",
            )
            .await
            .unwrap();
        let sizes: Vec<_> = receipt.files.iter().map(|f| f.size).collect();
        assert_eq!(sizes, [10, 4]);
        assert_eq!(receipt.container.description, "Screen capture");
    }

    #[tokio::test]
    async fn flac_audio_is_accepted() {
        let tmp = tempfile::tempdir().unwrap();
        let host = Arc::new(FakeHost::default());
        let svc = service(&host, tmp.path(), settings());

        let audio = BinaryObject::new(vec![3u8; 3 * KB], "audio/flac");
        let receipt = svc
            .upload(&audio, "interview", "Phone screen")
            .await
            .unwrap();
        assert_eq!(
            receipt.reference.as_str(),
            "https://host/c1|https://host/c1/raw/interview.flac"
        );
        assert!(validate_parts(&[UploadPart::new("take-2.flac", vec![1])]).is_ok());
    }

    #[test]
    fn manifest_lists_parts_with_digests() {
        let parts = vec![
            UploadPart::new("a-part1of2.webm", b"hello".to_vec()),
            UploadPart::new("a-part2of2.webm", b"".to_vec()),
        ];
        let manifest = render_manifest("  ", &parts);
        assert!(manifest.starts_with("# Media upload\n"));
        assert!(manifest.contains("2 part(s), 5 bytes in total."));
        assert!(manifest.contains("| 1 | a-part1of2.webm | 5 | 5d41402abc4b2a76b9719d911017c592 |"));
        assert!(manifest.contains("| 2 | a-part2of2.webm | 0 | d41d8cd98f00b204e9800998ecf8427e |"));
    }

    #[test]
    fn locators_follow_part_numbers_not_listing_order() {
        let listing = vec![
            FakeHost::file("rec-part10of11.webm", 1),
            FakeHost::file("manifest.md", 1),
            FakeHost::file("rec-part1of11.webm", 1),
            FakeHost::file("rec-part2of11.webm", 1),
            FakeHost::file("notes.txt", 1),
        ];
        let names: Vec<_> = select_locators(listing)
            .into_iter()
            .map(|l| l.filename)
            .collect();
        assert_eq!(
            names,
            ["rec-part1of11.webm", "rec-part2of11.webm", "rec-part10of11.webm"]
        );
    }

    #[test]
    fn unnumbered_files_keep_host_order() {
        let listing = vec![FakeHost::file("b.webm", 1), FakeHost::file("a.webm", 1)];
        let names: Vec<_> = select_locators(listing)
            .into_iter()
            .map(|l| l.filename)
            .collect();
        assert_eq!(names, ["b.webm", "a.webm"]);
    }

    #[test]
    fn states_map_to_stages() {
        assert_eq!(UploadState::Creating.stage(), Some(UploadStage::ContainerCreate));
        assert_eq!(UploadState::Pushing(3).chunk_index(), Some(3));
        assert_eq!(UploadState::Done.stage(), None);
        assert_eq!(UploadState::Committing(0).to_string(), "committing(0)");
    }
}
