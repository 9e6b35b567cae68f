use thiserror::Error;

/// Errors from a storage backend that request handlers can act on
#[derive(Error, Debug)]
pub enum StorageError {
    /// No stored file under the given name
    #[error("File '{name}' not found")]
    NotFound { name: String },

    /// Name is not a single plain path component
    #[error("Invalid stored file name '{name}'")]
    InvalidName { name: String },

    /// Every candidate name was already taken
    #[error("Could not find a free name for '{name}' after {attempts} attempts")]
    NameExhausted { name: String, attempts: usize },

    /// Underlying filesystem failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
