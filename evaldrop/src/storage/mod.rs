//! Persistence for uploaded log files.
//!
//! - [`FileStorage`]: the backend contract used by the request handlers
//! - [`LocalFileStorage`]: a single local directory, the only backend
//! - [`StorageError`]: backend failures, converted to [`crate::errors::Error`] at the handler edge

mod errors;
mod local;

pub use errors::{Result, StorageError};
pub use local::LocalFileStorage;

use async_trait::async_trait;

/// A file persisted under its final, unique name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

/// Trait for file storage backends
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist `content` under `name`, or under a disambiguated name if `name` is taken.
    /// Never overwrites an existing file.
    async fn store(&self, name: &str, content: &[u8]) -> Result<StoredFile>;

    /// Read back a stored file by exact name. Anything that is not a regular file is not found.
    async fn retrieve(&self, name: &str) -> Result<Vec<u8>>;
}
