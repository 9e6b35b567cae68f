//! Test utilities for handler tests.

use crate::config::Config;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use std::path::Path;
use tempfile::TempDir;

/// A running test server backed by its own temporary storage directory
pub struct TestApp {
    pub server: TestServer,
    pub config: Config,
    storage_dir: TempDir,
}

impl TestApp {
    pub fn storage_path(&self) -> &Path {
        self.storage_dir.path()
    }

    /// Contents of a stored file, read straight from disk
    pub fn stored(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.storage_path().join(name)).unwrap_or_else(|e| panic!("Failed to read stored file {name}: {e}"))
    }

    /// Names currently in the storage directory, sorted
    pub fn stored_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.storage_path())
            .expect("Failed to list storage directory")
            .map(|entry| entry.expect("Failed to read entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn create_test_config(storage_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        storage_dir: storage_dir.to_path_buf(),
        max_upload_size: 1024 * 1024,
        ..Default::default()
    }
}

pub async fn create_test_app() -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create temp storage dir");
    let config = create_test_config(storage_dir.path());

    let app = crate::Application::new(config.clone())
        .await
        .expect("Failed to create application");

    TestApp {
        server: app.into_test_server(),
        config,
        storage_dir,
    }
}

/// Multipart body with a single `file` part
pub fn file_upload(filename: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(content.to_vec()).file_name(filename))
}
