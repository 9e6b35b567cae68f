use crate::filename::ALLOWED_EXTENSION;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Upload had no file part, or the file part had an empty filename
    #[error("No file selected")]
    NoFileSelected,

    /// Uploaded filename does not carry the allowed extension
    #[error("Only .{ext} files are allowed", ext = ALLOWED_EXTENSION)]
    InvalidExtension { filename: String },

    /// Download form submitted without a URL
    #[error("Please provide a valid URL")]
    MissingUrl,

    /// No stored filename could be read out of the pasted URL
    #[error("Could not extract filename from URL. Please check the URL format.")]
    UnrecognizedUrl { url: String },

    /// Malformed request body
    #[error("{message}")]
    BadRequest { message: String },

    /// Upload exceeded the configured body limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// No stored file with this name
    #[error("File '{name}' not found")]
    NotFound { name: String },

    /// Filesystem failure while handling a file
    #[error("Error {operation} file: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: StorageError,
    },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Attach the failed operation ("saving", "serving", "downloading") to a storage error.
    /// Missing files become [`Error::NotFound`].
    pub fn storage(operation: &'static str, source: StorageError) -> Self {
        match source {
            StorageError::NotFound { name } => Error::NotFound { name },
            source => Error::Io { operation, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoFileSelected
            | Error::InvalidExtension { .. }
            | Error::MissingUrl
            | Error::UnrecognizedUrl { .. }
            | Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Io { .. } | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the user. I/O failures include the underlying error text.
    pub fn user_message(&self) -> String {
        match self {
            Error::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Log at a level matching the severity
    pub fn log(&self) {
        match self {
            Error::Io { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::NotFound { .. } => {
                tracing::info!("Not found: {}", self);
            }
            _ => {
                tracing::debug!("Client error: {}", self);
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.log();
        (self.status_code(), self.user_message()).into_response()
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
