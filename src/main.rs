use anyhow::{Context, Result};
use axum::{Router, extract::DefaultBodyLimit};
use sqlx::sqlite::SqlitePoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

use services::{
    note_service::NoteService, playback_resolver::PlaybackResolver, remote::gist::GistClient,
    upload_service::UploadService,
};
use state::AppState;

const MIGRATION_PATH: &str = "migrations/0001_init.sql";

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting media-relay with config: {:?}", cfg);

    // --- Ensure scratch directory exists ---
    if !cfg.scratch_dir.exists() {
        fs::create_dir_all(&cfg.scratch_dir)?;
        tracing::info!("Created scratch directory at {}", cfg.scratch_dir.display());
    }

    // --- Initialize SQLite connection ---
    let db_url = &cfg.database_url;
    let db_path = db_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    if !db_path.starts_with(":memory:") {
        let db_path_obj = Path::new(db_path);
        if let Some(parent) = db_path_obj.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
                tracing::info!("Created missing directory {:?}", parent);
            }
        }
        // SQLx will not create the file on its own without `mode=rwc`.
        if let Err(e) = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(db_path_obj)
        {
            tracing::warn!("Failed to open database file manually: {}", e);
        }
    }

    let db = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
            .with_context(|| format!("connecting to {}", db_url))?,
    );

    // --- Handle migration mode ---
    if migrate {
        run_migrations(&db).await?;
        tracing::info!("Database migration complete.");
        return Ok(());
    }

    // --- Initialize core services ---
    let client = GistClient::new(
        cfg.api_base.clone(),
        cfg.token.clone(),
        cfg.git_settings(),
    )?;
    let uploads = UploadService::new(
        Arc::new(client),
        cfg.scratch_dir.clone(),
        cfg.upload_settings(),
    );
    tracing::info!(
        "Chunk ceiling {} bytes, {:?} between pushes, {:?} per remote step",
        uploads.settings().chunk_ceiling,
        uploads.settings().chunk_delay,
        uploads.settings().step_timeout
    );

    let state = AppState {
        uploads,
        notes: NoteService::new(db.clone()),
        resolver: PlaybackResolver::new(cfg.container_host.clone()),
        scratch_root: cfg.scratch_dir.clone(),
    };

    // --- Build router ---
    let app: Router = routes::routes::routes()
        .layer(DefaultBodyLimit::max(cfg.max_body_bytes))
        .with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Apply the bundled schema from disk.
async fn run_migrations(db: &sqlx::SqlitePool) -> Result<()> {
    if !Path::new(MIGRATION_PATH).exists() {
        anyhow::bail!("Migration file not found: {}", MIGRATION_PATH);
    }

    let sql = fs::read_to_string(MIGRATION_PATH)?;
    let applied = db::apply_migration_sql(db, &sql).await?;
    tracing::info!("Ran {} migration statements", applied);

    Ok(())
}
