//! # evaldrop: upload and retrieval service for `.eval` log files
//!
//! `evaldrop` accepts uploaded `.eval` files, keeps them in a single local directory, and hands
//! the uploader a link into a separate log viewer application. Files can be fetched back either
//! by name or by pasting a viewer link.
//!
//! ## Request Flow
//!
//! An upload (`POST /`) is validated (present, non-empty name, `.eval` extension), its name is
//! sanitized, and the bytes are written to the storage directory. If the sanitized name is
//! already taken, a random 8-hex-character prefix is added, so an existing file is never
//! replaced. The response redirects to `http://<domain_name>:<viewer_port>/#/logs/<name>`.
//!
//! A download (`POST /download`) takes a pasted viewer link, reads the filename after its last
//! `/`, and returns that file as an attachment. `GET /logs/{filename}` serves a file directly.
//!
//! ## Components
//!
//! - [`filename`]: sanitation, extension check and collision renaming
//! - [`viewer`]: viewer link construction and filename extraction
//! - [`storage`]: the [`storage::FileStorage`] trait and its local directory backend
//! - [`api`]: axum handlers for the routes above
//! - [`config`], [`errors`], [`telemetry`]: configuration, error reporting and tracing
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use evaldrop::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = evaldrop::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     evaldrop::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config).await?.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await
//! }
//! ```
pub mod api;
pub mod config;
pub mod errors;
pub mod filename;
pub mod storage;
pub mod telemetry;
mod templates;
pub mod viewer;

#[cfg(test)]
mod test_utils;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use minijinja::Environment;
use std::sync::Arc;
use storage::{FileStorage, LocalFileStorage};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};
use viewer::ViewerUrl;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config.clone())
///     .viewer(config.viewer_url())
///     .storage(Arc::new(LocalFileStorage::new(&config.storage_dir)))
///     .templates(Arc::new(templates::environment()))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub viewer: ViewerUrl,
    pub storage: Arc<dyn FileStorage>,
    pub templates: Arc<Environment<'static>>,
}

/// Build the application router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let upload_limit = usize::try_from(state.config.max_upload_size).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/",
            get(api::handlers::index::index).post(api::handlers::uploads::upload_file),
        )
        .route("/download", post(api::handlers::files::download_by_url))
        .route("/logs/{filename}", get(api::handlers::files::serve_file))
        .route("/healthz", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Main application struct that owns the router and configuration.
///
/// 1. **Create**: [`Application::new`] creates the storage directory and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests until shutdown
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting evaldrop with configuration: {:#?}", config);

        let storage = LocalFileStorage::new(&config.storage_dir);
        storage
            .ensure_dir()
            .await
            .with_context(|| format!("Failed to create storage directory {}", config.storage_dir.display()))?;
        info!("Storing uploads in {}", storage.base_path().display());

        let viewer = config.viewer_url();
        info!("Viewer links start with {}", viewer.base());

        let state = AppState::builder()
            .config(config.clone())
            .viewer(viewer)
            .storage(Arc::new(storage))
            .templates(Arc::new(templates::environment()))
            .build();

        Ok(Self {
            router: build_router(state),
            config,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("Failed to bind {bind_addr}"))?;
        info!("evaldrop listening on http://{}", bind_addr);

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Application;
    use crate::test_utils::create_test_config;

    #[tokio::test]
    async fn test_new_creates_missing_storage_dir() {
        let root = tempfile::tempdir().unwrap();
        let storage_dir = root.path().join("nested").join("logs");

        Application::new(create_test_config(&storage_dir)).await.unwrap();
        assert!(storage_dir.is_dir());

        // Second start over an existing directory is fine
        Application::new(create_test_config(&storage_dir)).await.unwrap();
    }

    #[tokio::test]
    async fn test_new_fails_when_storage_path_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let storage_dir = root.path().join("logs");
        std::fs::write(&storage_dir, b"not a directory").unwrap();

        assert!(Application::new(create_test_config(&storage_dir)).await.is_err());
    }
}
