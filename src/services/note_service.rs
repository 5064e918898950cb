//! src/services/note_service.rs
//!
//! NoteService: keeps the media reference string attached to an external
//! parent record. The string is stored opaquely; it is decoded only to fill
//! the `container_url` and `part_count` convenience columns.

use crate::{models::note::MediaNote, services::reference_codec};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const MAX_RECORD_ID_LEN: usize = 128;
const MAX_REFERENCE_LEN: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("no media note for record `{0}`")]
    NotFound(String),
    #[error("invalid record id `{0}`")]
    InvalidRecordId(String),
    #[error("reference is empty or too long")]
    InvalidReference,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type NoteResult<T> = Result<T, NoteError>;

#[derive(Clone)]
pub struct NoteService {
    pub db: Arc<SqlitePool>,
}

impl NoteService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Attach `reference` to `record_id`, replacing whatever was there.
    ///
    /// The previous string is discarded; its remote container is untouched.
    pub async fn attach(&self, record_id: &str, reference: &str) -> NoteResult<MediaNote> {
        ensure_record_id(record_id)?;
        let reference = reference.trim();
        if reference.is_empty() || reference.len() > MAX_REFERENCE_LEN {
            return Err(NoteError::InvalidReference);
        }

        let parsed = reference_codec::decode(reference);
        let (container_url, part_count) = if parsed.composite {
            (Some(parsed.container_url), parsed.locators.len() as i64)
        } else {
            (None, 0)
        };

        let note = sqlx::query_as::<_, MediaNote>(
            r#"
            INSERT INTO media_notes (record_id, reference, container_url, part_count, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(record_id) DO UPDATE SET
                reference = excluded.reference,
                container_url = excluded.container_url,
                part_count = excluded.part_count,
                updated_at = excluded.updated_at
            RETURNING record_id, reference, container_url, part_count, updated_at
            "#,
        )
        .bind(record_id)
        .bind(reference)
        .bind(container_url)
        .bind(part_count)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        debug!("attached {}-part reference to record {}", part_count, record_id);
        Ok(note)
    }

    /// Fetch the note for `record_id`.
    pub async fn get(&self, record_id: &str) -> NoteResult<MediaNote> {
        ensure_record_id(record_id)?;
        sqlx::query_as::<_, MediaNote>(
            "SELECT record_id, reference, container_url, part_count, updated_at
             FROM media_notes WHERE record_id = ?",
        )
        .bind(record_id)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => NoteError::NotFound(record_id.to_string()),
            other => NoteError::Sqlx(other),
        })
    }

    /// Drop the note for `record_id`.
    pub async fn clear(&self, record_id: &str) -> NoteResult<()> {
        ensure_record_id(record_id)?;
        let result = sqlx::query("DELETE FROM media_notes WHERE record_id = ?")
            .bind(record_id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(NoteError::NotFound(record_id.to_string()));
        }
        Ok(())
    }
}

/// Check a parent record id without touching the database.
pub fn ensure_record_id(record_id: &str) -> NoteResult<()> {
    let valid = !record_id.is_empty()
        && record_id.len() <= MAX_RECORD_ID_LEN
        && record_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(NoteError::InvalidRecordId(record_id.to_string()))
    }
}
