//! Gist-backed remote containers.
//!
//! Containers are created and listed through the REST API; chunk files are
//! pushed with the `git` binary because the API only accepts text content.

use super::{RemoteContainerClient, RemoteError, RemoteResult};
use crate::models::container::{ContainerFile, RemoteContainer};
use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use std::{path::Path, process::Stdio};
use tokio::process::Command;
use tracing::debug;

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("media-relay/", env!("CARGO_PKG_VERSION"));

/// Settings for the `git` side of the transport.
#[derive(Clone, Debug)]
pub struct GitSettings {
    /// Path or name of the git executable.
    pub bin: String,
    pub user_name: String,
    pub user_email: String,
    /// Value for `http.postBuffer`, in bytes.
    pub post_buffer: u64,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            bin: "git".into(),
            user_name: "media-relay".into(),
            user_email: "media-relay@users.noreply.github.com".into(),
            post_buffer: 524_288_000,
        }
    }
}

#[derive(Clone)]
pub struct GistClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    git: GitSettings,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    id: String,
    html_url: String,
    git_push_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    files: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    size: u64,
    raw_url: String,
}

impl GistClient {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        git: GitSettings,
    ) -> RemoteResult<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            git,
        })
    }

    /// Turn a non-2xx response into `RemoteError::Api`, otherwise decode JSON.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> RemoteResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: api_message(status, &message),
            });
        }
        Ok(resp.json::<T>().await?)
    }

    /// Replace the credential wherever it might leak into text.
    fn redact(&self, text: &str) -> String {
        if self.token.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.token, "***")
        }
    }

    async fn run_git(&self, dir: &Path, args: &[&str]) -> RemoteResult<()> {
        debug!("git {} (in {})", self.redact(&args.join(" ")), dir.display());
        let output = Command::new(&self.git.bin)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RemoteError::Git {
                command: self.redact(&args.join(" ")),
                status: output.status,
                stderr: self.redact(String::from_utf8_lossy(&output.stderr).trim()),
            })
        }
    }
}

#[async_trait]
impl RemoteContainerClient for GistClient {
    async fn create(
        &self,
        description: &str,
        initial_file: &str,
        initial_content: &str,
    ) -> RemoteResult<RemoteContainer> {
        let body = json!({
            "description": description,
            "public": true,
            "files": { initial_file: { "content": initial_content } },
        });
        let resp = self
            .http
            .post(format!("{}/gists", self.api_base))
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT_GITHUB_JSON)
            .json(&body)
            .send()
            .await?;
        let gist: GistResponse = Self::decode(resp).await?;
        Ok(container_from(gist, description))
    }

    async fn mirror_into(&self, container: &RemoteContainer, mirror: &Path) -> RemoteResult<()> {
        let parent = mirror.parent().ok_or_else(|| {
            RemoteError::InvalidResponse(format!("mirror path {} has no parent", mirror.display()))
        })?;
        let url = authenticated_url(&container.push_url, &self.token)?;
        let target = mirror.to_string_lossy().into_owned();
        self.run_git(parent, &["clone", "--quiet", url.as_str(), target.as_str()])
            .await?;

        let post_buffer = self.git.post_buffer.to_string();
        self.run_git(mirror, &["config", "user.name", self.git.user_name.as_str()])
            .await?;
        self.run_git(mirror, &["config", "user.email", self.git.user_email.as_str()])
            .await?;
        self.run_git(mirror, &["config", "http.postBuffer", post_buffer.as_str()])
            .await
    }

    async fn commit(&self, mirror: &Path, message: &str) -> RemoteResult<()> {
        self.run_git(mirror, &["add", "--all"]).await?;
        self.run_git(mirror, &["commit", "--quiet", "-m", message])
            .await
    }

    async fn push(&self, mirror: &Path) -> RemoteResult<()> {
        self.run_git(mirror, &["push", "--quiet", "origin", "HEAD"])
            .await
    }

    async fn list(&self, container: &RemoteContainer) -> RemoteResult<Vec<ContainerFile>> {
        let resp = self
            .http
            .get(format!("{}/gists/{}", self.api_base, container.id))
            .bearer_auth(&self.token)
            .header(header::ACCEPT, ACCEPT_GITHUB_JSON)
            .send()
            .await?;
        let gist: GistResponse = Self::decode(resp).await?;
        listing_from(gist.files)
    }
}

fn container_from(gist: GistResponse, requested_description: &str) -> RemoteContainer {
    let push_url = gist
        .git_push_url
        .unwrap_or_else(|| format!("{}.git", gist.html_url));
    RemoteContainer {
        id: gist.id,
        url: gist.html_url,
        push_url,
        description: gist
            .description
            .unwrap_or_else(|| requested_description.to_string()),
    }
}

/// Flatten the `files` object, keeping the host's key order.
fn listing_from(
    files: serde_json::Map<String, serde_json::Value>,
) -> RemoteResult<Vec<ContainerFile>> {
    files
        .into_iter()
        .map(|(filename, value)| {
            let file: GistFile = serde_json::from_value(value).map_err(|err| {
                RemoteError::InvalidResponse(format!("file entry `{}`: {}", filename, err))
            })?;
            Ok(ContainerFile {
                filename,
                size: file.size,
                raw_url: file.raw_url,
            })
        })
        .collect()
}

/// Embed the credential as the URL user so `git` can push without prompting.
fn authenticated_url(push_url: &str, token: &str) -> RemoteResult<Url> {
    let mut url = Url::parse(push_url)
        .map_err(|err| RemoteError::InvalidResponse(format!("push url: {}", err)))?;
    if url.scheme() != "https" {
        return Err(RemoteError::InvalidResponse(format!(
            "push url must be https, got `{}`",
            url.scheme()
        )));
    }
    url.set_username(token)
        .map_err(|_| RemoteError::InvalidResponse("push url cannot carry credentials".into()))?;
    Ok(url)
}

fn api_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
