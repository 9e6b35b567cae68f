//! HTTP layer: route handlers and the form models they accept.
//!
//! - `GET /` renders the upload/download page
//! - `POST /` stores an uploaded `.eval` file and redirects to the viewer
//! - `POST /download` resolves a pasted viewer link and returns the file as an attachment
//! - `GET /logs/{filename}` serves a stored file by name

pub mod handlers;
pub mod models;
