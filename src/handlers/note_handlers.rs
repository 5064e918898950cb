//! HTTP handlers for media notes attached to parent records.

use crate::{
    errors::AppError, handlers::playback_handlers::PlaybackResponse, models::note::MediaNote,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Body for `PUT /records/{record_id}/note`.
#[derive(Debug, Deserialize)]
pub struct PutNoteReq {
    pub reference: String,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub note: MediaNote,
    pub playback: PlaybackResponse,
}

impl NoteResponse {
    fn new(state: &AppState, note: MediaNote) -> Self {
        let playback = state.resolver.resolve(&note.reference).into();
        Self { note, playback }
    }
}

/// GET `/records/{record_id}/note`
pub async fn get_note(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<NoteResponse>, AppError> {
    let note = state.notes.get(&record_id).await?;
    Ok(Json(NoteResponse::new(&state, note)))
}

/// PUT `/records/{record_id}/note` stores a pasted link or reference.
pub async fn put_note(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
    Json(payload): Json<PutNoteReq>,
) -> Result<Json<NoteResponse>, AppError> {
    let note = state.notes.attach(&record_id, &payload.reference).await?;
    Ok(Json(NoteResponse::new(&state, note)))
}

/// DELETE `/records/{record_id}/note`. The remote container is left alone.
pub async fn delete_note(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.notes.clear(&record_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
