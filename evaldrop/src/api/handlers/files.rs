//! Retrieval of stored files, by name or by a pasted viewer link.

use axum::{
    Form,
    extract::{Path, State, rejection::FormRejection},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{info, instrument};

use crate::{
    AppState,
    api::handlers::index::render_error,
    api::models::forms::DownloadForm,
    errors::{Error, Result},
    viewer,
};

/// Resolve a pasted viewer link and return the file as an attachment.
///
/// A body that cannot be decoded as a form re-renders the page with a 400, like any other
/// download error.
#[instrument(skip_all)]
pub async fn download_by_url(
    State(state): State<AppState>,
    form: std::result::Result<Form<DownloadForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            return render_error(
                &state,
                Error::BadRequest {
                    message: format!("Failed to parse form data: {}", rejection.body_text()),
                },
            );
        }
    };

    match fetch_by_url(&state, form.eval_url.as_deref()).await {
        Ok((name, content)) => {
            info!(filename = %name, size = content.len(), "Serving download");
            let disposition = format!("attachment; filename=\"{}\"", name.replace(['"', '\\'], "_"));
            (
                [
                    (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                content,
            )
                .into_response()
        }
        Err(e) => render_error(&state, e),
    }
}

async fn fetch_by_url(state: &AppState, url: Option<&str>) -> Result<(String, Vec<u8>)> {
    let url = url.map(str::trim).filter(|url| !url.is_empty()).ok_or(Error::MissingUrl)?;

    let name = viewer::extract_filename(url).ok_or_else(|| Error::UnrecognizedUrl { url: url.to_string() })?;

    let content = state
        .storage
        .retrieve(name)
        .await
        .map_err(|e| Error::storage("downloading", e))?;

    Ok((name.to_string(), content))
}

/// Serve a stored file by its exact name.
#[instrument(skip(state))]
pub async fn serve_file(State(state): State<AppState>, Path(filename): Path<String>) -> Result<Response> {
    let content = state
        .storage
        .retrieve(&filename)
        .await
        .map_err(|e| Error::storage("serving", e))?;

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        content,
    )
        .into_response())
}
