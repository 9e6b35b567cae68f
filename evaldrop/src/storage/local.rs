use super::{FileStorage, Result, StorageError, StoredFile};
use crate::filename::{collision_name, random_token};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// How many disambiguated names to try after the requested one is taken.
const MAX_RENAME_ATTEMPTS: usize = 3;

/// Local filesystem storage backend - every file lives directly in one directory.
///
/// Writes go to a hidden temporary file first and are published with a hard link, which fails
/// if the target exists. A published name therefore always refers to a complete file and is
/// never replaced.
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Create the storage directory if it is missing
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.base_path).await
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path for `name` inside the storage directory, if `name` is a plain visible file name
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        is_plain_name(name).then(|| self.base_path.join(name))
    }

    async fn write_temp(&self, temp_path: &Path, content: &[u8]) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }

    async fn publish(&self, temp_path: &Path, name: &str) -> Result<String> {
        let mut candidate = name.to_string();

        for _ in 0..=MAX_RENAME_ATTEMPTS {
            let target = self
                .resolve(&candidate)
                .ok_or_else(|| StorageError::InvalidName { name: candidate.clone() })?;

            match fs::hard_link(temp_path, &target).await {
                Ok(()) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let renamed = collision_name(name, &random_token());
                    debug!(taken = %candidate, renamed = %renamed, "Stored name already exists, renaming");
                    candidate = renamed;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::NameExhausted {
            name: name.to_string(),
            attempts: MAX_RENAME_ATTEMPTS + 1,
        })
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, name: &str, content: &[u8]) -> Result<StoredFile> {
        if !is_plain_name(name) {
            return Err(StorageError::InvalidName { name: name.to_string() });
        }

        let temp_path = self.base_path.join(format!(".upload-{}.tmp", Uuid::new_v4().simple()));

        let published = match self.write_temp(&temp_path, content).await {
            Ok(()) => self.publish(&temp_path, name).await,
            Err(e) => Err(e),
        };

        if let Err(e) = fs::remove_file(&temp_path).await
            && e.kind() != ErrorKind::NotFound
        {
            warn!(path = %temp_path.display(), error = %e, "Failed to remove temporary upload file");
        }

        Ok(StoredFile {
            name: published?,
            size: content.len() as u64,
        })
    }

    async fn retrieve(&self, name: &str) -> Result<Vec<u8>> {
        let not_found = || StorageError::NotFound { name: name.to_string() };
        let path = self.resolve(name).ok_or_else(not_found)?;

        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        match fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A single normal path component that is not hidden
fn is_plain_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, LocalFileStorage) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = LocalFileStorage::new(dir.path());
        (dir, storage)
    }

    fn is_collision_name(name: &str, original: &str) -> bool {
        match name.split_once('-') {
            Some((token, rest)) => {
                token.len() == 8 && token.chars().all(|c| c.is_ascii_hexdigit()) && rest == original
            }
            None => false,
        }
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().join("logs"));

        storage.ensure_dir().await.unwrap();
        storage.ensure_dir().await.unwrap();

        assert!(storage.base_path().is_dir());
    }

    #[tokio::test]
    async fn test_store_new_name_keeps_it() {
        let (dir, storage) = storage();

        let stored = storage.store("report.eval", b"abc").await.unwrap();

        assert_eq!(stored.name, "report.eval");
        assert_eq!(stored.size, 3);
        assert_eq!(std::fs::read(dir.path().join("report.eval")).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_store_collision_renames_and_keeps_original() {
        let (dir, storage) = storage();

        storage.store("report.eval", b"abc").await.unwrap();
        let second = storage.store("report.eval", b"xyz").await.unwrap();

        assert_ne!(second.name, "report.eval");
        assert!(is_collision_name(&second.name, "report.eval"), "unexpected name {}", second.name);
        assert_eq!(std::fs::read(dir.path().join("report.eval")).unwrap(), b"abc");
        assert_eq!(std::fs::read(dir.path().join(&second.name)).unwrap(), b"xyz");
    }

    #[tokio::test]
    async fn test_store_leaves_no_temporary_files() {
        let (dir, storage) = storage();

        storage.store("a.eval", b"1").await.unwrap();
        storage.store("a.eval", b"2").await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| !n.starts_with('.')));
    }

    #[tokio::test]
    async fn test_concurrent_stores_of_same_name_never_overwrite() {
        let (dir, storage) = storage();

        let (a, b, c) = tokio::join!(
            storage.store("same.eval", b"first"),
            storage.store("same.eval", b"second"),
            storage.store("same.eval", b"third"),
        );
        let stored = [a.unwrap(), b.unwrap(), c.unwrap()];

        let mut names: Vec<&str> = stored.iter().map(|s| s.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);

        let mut contents: Vec<Vec<u8>> = stored
            .iter()
            .map(|s| std::fs::read(dir.path().join(&s.name)).unwrap())
            .collect();
        contents.sort();
        assert_eq!(contents, vec![b"first".to_vec(), b"second".to_vec(), b"third".to_vec()]);
    }

    #[tokio::test]
    async fn test_store_rejects_path_like_names() {
        let (_dir, storage) = storage();

        for name in ["../escape.eval", "sub/dir.eval", ".hidden.eval", "", ".."] {
            let result = storage.store(name, b"x").await;
            assert!(
                matches!(result, Err(StorageError::InvalidName { .. })),
                "expected {name:?} to be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_retrieve_round_trip() {
        let (_dir, storage) = storage();

        let stored = storage.store("log.eval", b"\x00\x01binary").await.unwrap();
        let content = storage.retrieve(&stored.name).await.unwrap();

        assert_eq!(content, b"\x00\x01binary");
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_not_found_and_creates_nothing() {
        let (dir, storage) = storage();

        let result = storage.retrieve("missing.eval").await;

        assert!(matches!(result, Err(StorageError::NotFound { ref name }) if name == "missing.eval"));
        assert!(!dir.path().join("missing.eval").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_retrieve_traversal_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.eval"), b"outside").unwrap();
        let storage = LocalFileStorage::new(dir.path().join("logs"));
        storage.ensure_dir().await.unwrap();

        for name in ["../secret.eval", "..", ".", "..\\secret.eval"] {
            assert!(
                matches!(storage.retrieve(name).await, Err(StorageError::NotFound { .. })),
                "expected {name:?} to be not found"
            );
        }
    }

    #[tokio::test]
    async fn test_retrieve_directory_is_not_found() {
        let (dir, storage) = storage();
        std::fs::create_dir(dir.path().join("folder.eval")).unwrap();

        let result = storage.retrieve("folder.eval").await;

        assert!(matches!(result, Err(StorageError::NotFound { ref name }) if name == "folder.eval"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_retrieve_unreadable_entry_is_io_error() {
        let (dir, storage) = storage();
        std::os::unix::fs::symlink("loop.eval", dir.path().join("loop.eval")).unwrap();

        let result = storage.retrieve("loop.eval").await;

        assert!(matches!(result, Err(StorageError::Io(_))), "unexpected {result:?}");
    }
}
