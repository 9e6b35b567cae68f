//! Axum route handlers.
//!
//! Form submissions (`POST /`, `POST /download`) report failures by re-rendering the index page
//! with the error message and the error's status code. `GET /logs/{filename}` reports failures
//! as plain text through [`crate::errors::Error`]'s `IntoResponse`.

pub mod files;
pub mod index;
pub mod uploads;
