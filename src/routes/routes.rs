//! Route table for the media relay.
//!
//! - `GET    /healthz`, `GET /readyz`: probes
//! - `POST   /uploads`: chunk and push a recording (or pre-cut parts)
//! - `GET    /playback?url=`: resolve a stored reference for a player
//! - `GET|PUT|DELETE /records/{record_id}/note`: reference attached to a parent record

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        note_handlers::{delete_note, get_note, put_note},
        playback_handlers::resolve_playback,
        upload_handlers::create_upload,
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build the router; state is attached by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/uploads", post(create_upload))
        .route("/playback", get(resolve_playback))
        .route(
            "/records/{record_id}/note",
            get(get_note).put(put_note).delete(delete_note),
        )
}
