//! Shared application state handed to every handler.

use crate::services::{
    note_service::NoteService, playback_resolver::PlaybackResolver,
    upload_service::UploadService,
};
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadService,
    pub notes: NoteService,
    pub resolver: PlaybackResolver,
    /// Parent directory of all scratch workspaces.
    pub scratch_root: PathBuf,
}
