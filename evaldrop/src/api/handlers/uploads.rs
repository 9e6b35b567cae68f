//! `.eval` uploads.

use axum::{
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, instrument};

use crate::{
    AppState,
    api::handlers::index::render_error,
    errors::{Error, Result},
    filename::{has_allowed_extension, is_storable_name, sanitize_filename},
    storage::StoredFile,
};

/// Store the uploaded file and redirect to its viewer link.
#[instrument(skip_all)]
pub async fn upload_file(State(state): State<AppState>, multipart: Multipart) -> Response {
    match save_upload(&state, multipart).await {
        Ok(stored) => {
            info!(stored_as = %stored.name, size = stored.size, "Upload stored");
            Redirect::to(&state.viewer.link_for(&stored.name)).into_response()
        }
        Err(e) => render_error(&state, e),
    }
}

async fn save_upload(state: &AppState, mut multipart: Multipart) -> Result<StoredFile> {
    let (filename, content) = read_file_part(&mut multipart).await?.ok_or(Error::NoFileSelected)?;

    if filename.is_empty() {
        return Err(Error::NoFileSelected);
    }
    if !has_allowed_extension(&filename) {
        return Err(Error::InvalidExtension { filename });
    }

    let sanitized = sanitize_filename(&filename);
    if !is_storable_name(&sanitized) {
        return Err(Error::InvalidExtension { filename });
    }

    tracing::debug!(filename = %filename, sanitized = %sanitized, size = content.len(), "Storing upload");

    state
        .storage
        .store(&sanitized, &content)
        .await
        .map_err(|e| Error::storage("saving", e))
}

/// Filename and bytes of the first `file` part, skipping any other fields
async fn read_file_part(multipart: &mut Multipart) -> Result<Option<(String, Bytes)>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(multipart_error)?;
        return Ok(Some((filename, content)));
    }
    Ok(None)
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: format!("File exceeds the maximum upload size: {}", e.body_text()),
        }
    } else {
        Error::BadRequest {
            message: format!("Failed to parse multipart data: {}", e.body_text()),
        }
    }
}
