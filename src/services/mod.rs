pub mod chunker;
pub mod note_service;
pub mod playback_resolver;
pub mod reference_codec;
pub mod remote;
pub mod upload_service;
pub mod workspace;
