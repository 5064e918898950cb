pub mod health_handlers;
pub mod note_handlers;
pub mod playback_handlers;
pub mod upload_handlers;
