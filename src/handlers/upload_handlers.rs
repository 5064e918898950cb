//! HTTP handler for the upload entry point.
//! Buffers the multipart body, then hands it to `UploadService`; notes are
//! only written once an upload has fully succeeded.

use crate::{
    errors::AppError,
    models::{
        container::ChunkLocator,
        media::{BinaryObject, UploadPart},
    },
    services::{
        note_service::ensure_record_id,
        upload_service::{DEFAULT_BASE_NAME, UploadError},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, warn};

const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Success payload for `POST /uploads`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub container_url: String,
    pub reference: String,
    pub files: Vec<ChunkLocator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

/// Fields collected from the multipart body.
#[derive(Default)]
struct UploadForm {
    description: Option<String>,
    record_id: Option<String>,
    base_name: Option<String>,
    object: Option<BinaryObject>,
    parts: Vec<UploadPart>,
}

/// `POST /uploads`
///
/// Accepts either one `file` field (chunked here) or several `part` fields
/// (already chunked by the caller), plus `description`, and optionally
/// `record_id` and `base_name`.
pub async fn create_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_form(multipart).await?;

    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::bad_request("description is required"))?
        .to_string();
    if let Some(record_id) = form.record_id.as_deref() {
        ensure_record_id(record_id)?;
    }

    let outcome = match (form.object, form.parts.is_empty()) {
        (Some(_), false) => {
            return Err(AppError::bad_request(
                "send either one `file` field or `part` fields, not both",
            ));
        }
        (Some(object), true) => {
            let base_name = form.base_name.as_deref().unwrap_or(DEFAULT_BASE_NAME);
            state.uploads.upload(&object, base_name, &description).await
        }
        (None, false) => state.uploads.upload_parts(form.parts, &description).await,
        (None, true) => Err(UploadError::NoParts),
    };
    let receipt = outcome.map_err(|err| {
        warn!(stage = ?err.stage(), chunk_index = ?err.chunk_index(), "upload rejected: {}", err);
        err
    })?;

    if let Some(record_id) = form.record_id.as_deref() {
        state
            .notes
            .attach(record_id, receipt.reference.as_str())
            .await
            .map_err(|err| {
                error!("uploaded {} but could not attach it: {}", receipt.container.url, err);
                AppError::from(err).with_details(json!({
                    "reference": receipt.reference,
                    "container_url": receipt.container.url,
                    "persisted": false,
                }))
            })?;
    }

    Ok(Json(UploadResponse {
        container_url: receipt.container.url,
        reference: receipt.reference.into_string(),
        files: receipt.files,
        record_id: form.record_id,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "description" => form.description = Some(field.text().await.map_err(multipart_error)?),
            "record_id" => form.record_id = Some(field.text().await.map_err(multipart_error)?),
            "base_name" => form.base_name = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                if form.object.is_some() {
                    return Err(AppError::bad_request("only one `file` field is allowed"));
                }
                let media_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_MEDIA_TYPE)
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                form.object = Some(BinaryObject::new(data, media_type));
            }
            "part" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| AppError::bad_request("`part` fields need a filename"))?;
                let data = field.bytes().await.map_err(multipart_error)?;
                form.parts.push(UploadPart::new(filename, data));
            }
            other => debug!("ignoring multipart field `{}`", other),
        }
    }
    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), err.body_text())
}
