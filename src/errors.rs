use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt;

use crate::services::{
    note_service::NoteError,
    upload_service::{UploadError, UploadStage},
};

/// A lightweight wrapper for handler errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    /// Extra fields merged into the JSON body (e.g. the failed upload stage).
    pub details: Option<Value>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            details: None,
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.message,
            "status": self.status.as_u16()
        });
        if let (Some(Value::Object(extra)), Some(map)) = (self.details, body.as_object_mut()) {
            map.extend(extra);
        }

        (self.status, Json(body)).into_response()
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match &err {
            UploadError::NoParts
            | UploadError::EmptyObject
            | UploadError::InvalidPart { .. }
            | UploadError::Chunking(_) => AppError::bad_request(err.to_string()),
            UploadError::Workspace(_) => AppError::internal(err.to_string()),
            UploadError::Stage {
                stage,
                chunk_index,
                chunk_count,
                container_url,
                ..
            } => {
                let status = if err.timed_out() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                let mut details = json!({
                    "stage": stage,
                    "chunk_count": chunk_count,
                    "persisted": false,
                });
                if let Some(map) = details.as_object_mut() {
                    if let Some(index) = chunk_index {
                        map.insert("chunk_index".into(), json!(index));
                    }
                    // Creating the container is the only step that leaves nothing behind.
                    if *stage != UploadStage::ContainerCreate {
                        map.insert("container_url".into(), json!(container_url));
                    }
                }
                AppError::new(status, err.to_string()).with_details(details)
            }
        }
    }
}

impl From<NoteError> for AppError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::NotFound(_) => AppError::not_found(err.to_string()),
            NoteError::InvalidRecordId(_) | NoteError::InvalidReference => {
                AppError::bad_request(err.to_string())
            }
            NoteError::Sqlx(_) => AppError::internal(err.to_string()),
        }
    }
}
