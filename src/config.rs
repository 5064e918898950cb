use clap::Parser;
use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};
use thiserror::Error;

use crate::services::{remote::gist::GitSettings, upload_service::UploadSettings};

/// Configuration problems detected at startup, before any upload runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing remote host credential: set {0}")]
    MissingCredential(&'static str),
    #[error("invalid value `{value}` for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

const TOKEN_VAR: &str = "MEDIA_RELAY_TOKEN";
const TOKEN_FALLBACK_VAR: &str = "GITHUB_TOKEN";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub scratch_dir: PathBuf,
    pub database_url: String,
    pub api_base: String,
    pub container_host: String,
    pub chunk_ceiling: usize,
    pub chunk_delay: Duration,
    pub step_timeout: Duration,
    pub max_body_bytes: usize,
    pub git_bin: String,
    pub token: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Chunked media relay for size-limited hosts")]
pub struct Args {
    /// Host to bind to (overrides MEDIA_RELAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MEDIA_RELAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Parent directory for per-upload scratch workspaces (overrides MEDIA_RELAY_SCRATCH_DIR)
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Database URL (overrides MEDIA_RELAY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Remote host API base (overrides MEDIA_RELAY_API_BASE)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Hostname composite references point at (overrides MEDIA_RELAY_CONTAINER_HOST)
    #[arg(long)]
    pub container_host: Option<String>,

    /// Largest chunk in bytes (overrides MEDIA_RELAY_CHUNK_CEILING)
    #[arg(long)]
    pub chunk_ceiling: Option<usize>,

    /// Pause between pushes in milliseconds (overrides MEDIA_RELAY_CHUNK_DELAY_MS)
    #[arg(long)]
    pub chunk_delay_ms: Option<u64>,

    /// Deadline for each remote step in seconds (overrides MEDIA_RELAY_STEP_TIMEOUT_SECS)
    #[arg(long)]
    pub step_timeout_secs: Option<u64>,

    /// Largest accepted request body in bytes (overrides MEDIA_RELAY_MAX_BODY_BYTES)
    #[arg(long)]
    pub max_body_bytes: Option<usize>,

    /// git executable (overrides MEDIA_RELAY_GIT_BIN)
    #[arg(long)]
    pub git_bin: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool), ConfigError> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |var| env::var(var).ok())?;
        Ok((cfg, migrate))
    }

    /// Merge `args` over the variables visible through `lookup` over defaults.
    pub fn resolve(
        args: Args,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.into());

        let token = [TOKEN_VAR, TOKEN_FALLBACK_VAR]
            .iter()
            .filter_map(|name| lookup(*name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
            .ok_or(ConfigError::MissingCredential(TOKEN_VAR))?;

        let defaults = UploadSettings::default();
        let chunk_ceiling = match args.chunk_ceiling {
            Some(v) => v,
            None => parse_var(&lookup, "MEDIA_RELAY_CHUNK_CEILING", defaults.chunk_ceiling)?,
        };
        if chunk_ceiling == 0 {
            return Err(ConfigError::Invalid {
                var: "MEDIA_RELAY_CHUNK_CEILING",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let chunk_delay_ms = match args.chunk_delay_ms {
            Some(v) => v,
            None => parse_var(
                &lookup,
                "MEDIA_RELAY_CHUNK_DELAY_MS",
                defaults.chunk_delay.as_millis() as u64,
            )?,
        };
        let step_timeout_secs = match args.step_timeout_secs {
            Some(v) => v,
            None => parse_var(
                &lookup,
                "MEDIA_RELAY_STEP_TIMEOUT_SECS",
                defaults.step_timeout.as_secs(),
            )?,
        };
        let port = match args.port {
            Some(v) => v,
            None => parse_var(&lookup, "MEDIA_RELAY_PORT", 3000)?,
        };
        let max_body_bytes = match args.max_body_bytes {
            Some(v) => v,
            None => parse_var(&lookup, "MEDIA_RELAY_MAX_BODY_BYTES", 200 * 1024 * 1024)?,
        };

        Ok(Self {
            host: args
                .host
                .unwrap_or_else(|| var("MEDIA_RELAY_HOST", "0.0.0.0")),
            port,
            scratch_dir: args
                .scratch_dir
                .unwrap_or_else(|| var("MEDIA_RELAY_SCRATCH_DIR", "./data/scratch").into()),
            database_url: args.database_url.unwrap_or_else(|| {
                var(
                    "MEDIA_RELAY_DATABASE_URL",
                    "sqlite://./data/meta/media_relay.db",
                )
            }),
            api_base: args
                .api_base
                .unwrap_or_else(|| var("MEDIA_RELAY_API_BASE", "https://api.github.com")),
            container_host: args
                .container_host
                .unwrap_or_else(|| var("MEDIA_RELAY_CONTAINER_HOST", "gist.github.com")),
            chunk_ceiling,
            chunk_delay: Duration::from_millis(chunk_delay_ms),
            step_timeout: Duration::from_secs(step_timeout_secs),
            max_body_bytes,
            git_bin: args
                .git_bin
                .unwrap_or_else(|| var("MEDIA_RELAY_GIT_BIN", "git")),
            token,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            chunk_ceiling: self.chunk_ceiling,
            chunk_delay: self.chunk_delay,
            step_timeout: self.step_timeout,
        }
    }

    pub fn git_settings(&self) -> GitSettings {
        GitSettings {
            bin: self.git_bin.clone(),
            ..GitSettings::default()
        }
    }
}

// Hand-written so the credential never reaches the logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("scratch_dir", &self.scratch_dir)
            .field("database_url", &self.database_url)
            .field("api_base", &self.api_base)
            .field("container_host", &self.container_host)
            .field("chunk_ceiling", &self.chunk_ceiling)
            .field("chunk_delay", &self.chunk_delay)
            .field("step_timeout", &self.step_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("git_bin", &self.git_bin)
            .field("token", &"<redacted>")
            .finish()
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|err| ConfigError::Invalid {
                var,
                value: value.clone(),
                reason: err.to_string(),
            }),
        None => Ok(default),
    }
}
