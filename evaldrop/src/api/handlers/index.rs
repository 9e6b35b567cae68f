//! The upload/download page.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::instrument;

use crate::{AppState, errors::Error, templates};

#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>) -> Response {
    render_page(&state, StatusCode::OK, &[])
}

/// Re-render the page after a failed form submission, showing the error as an advisory
pub fn render_error(state: &AppState, error: Error) -> Response {
    error.log();
    render_page(state, error.status_code(), &[error.user_message()])
}

fn render_page(state: &AppState, status: StatusCode, messages: &[String]) -> Response {
    match templates::render_index(&state.templates, state.viewer.base(), messages) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render index page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
