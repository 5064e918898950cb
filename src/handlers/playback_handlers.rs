//! HTTP handler that classifies a stored or pasted link for playback.

use crate::{models::reference::Playback, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PlaybackQuery {
    pub url: Option<String>,
}

/// Resolution plus the multi-part notice a player should show.
#[derive(Debug, Serialize)]
pub struct PlaybackResponse {
    #[serde(flatten)]
    pub playback: Playback,
    pub part_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl From<Playback> for PlaybackResponse {
    fn from(playback: Playback) -> Self {
        let part_count = playback.part_count();
        let notice = (part_count > 1).then(|| {
            format!(
                "This recording has {} parts; playback starts with part 1.",
                part_count
            )
        });
        Self {
            playback,
            part_count,
            notice,
        }
    }
}

/// `GET /playback?url=...`. Never fails; unknown input is `is_valid: false`.
pub async fn resolve_playback(
    State(state): State<AppState>,
    Query(q): Query<PlaybackQuery>,
) -> Json<PlaybackResponse> {
    let playback = state.resolver.resolve(q.url.as_deref().unwrap_or_default());
    Json(playback.into())
}
