//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `EVALDROP_CONFIG`
//! environment variable. A missing file is not an error; every field has a default.
//!
//! ## Loading Priority
//!
//! 1. **Defaults** - see the `Default` implementation
//! 2. **YAML config file** - `config.yaml` unless overridden
//! 3. **Environment variables** - variables prefixed with `EVALDROP_` override YAML values
//! 4. **DOMAIN_NAME** - special case: overrides `domain_name` if set
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Viewer host used in redirect links
//! DOMAIN_NAME=logs.example.com
//!
//! # Bind to a non-privileged port and store uploads elsewhere
//! EVALDROP_PORT=8080
//! EVALDROP_STORAGE_DIR=/var/lib/evaldrop/logs
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::viewer::ViewerUrl;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "EVALDROP_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Host name of the external log viewer, used to build redirect links
    pub domain_name: String,
    /// Port the external log viewer listens on
    pub viewer_port: u16,
    /// Directory uploaded files are stored in, created at startup if missing
    pub storage_dir: PathBuf,
    /// Maximum accepted request body size for uploads, in bytes
    pub max_upload_size: u64,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 80,
            domain_name: "linuxbench.equistamp.io".to_string(),
            viewer_port: 7575,
            storage_dir: PathBuf::from("logs"),
            max_upload_size: 512 * 1024 * 1024,
            enable_otel_export: false,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(figment::Error::from)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), String> {
        if self.domain_name.is_empty() {
            return Err("Config validation: domain_name must not be empty".to_string());
        }
        if self.domain_name.contains(|c: char| c == '/' || c.is_whitespace()) {
            return Err(format!(
                "Config validation: domain_name '{}' must be a bare host name without slashes or whitespace",
                self.domain_name
            ));
        }
        if self.storage_dir.as_os_str().is_empty() {
            return Err("Config validation: storage_dir must not be empty".to_string());
        }
        if self.max_upload_size == 0 {
            return Err("Config validation: max_upload_size must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values (EVALDROP_CONFIG is the CLI's)
            .merge(Env::prefixed("EVALDROP_").ignore(&["config"]).split("__"))
            // DOMAIN_NAME is read unprefixed for compatibility with existing deployments
            .merge(Env::raw().only(&["DOMAIN_NAME"]).map(|_| "domain_name".into()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Viewer link prefix shared by every redirect and the index page
    pub fn viewer_url(&self) -> ViewerUrl {
        ViewerUrl::new(&self.domain_name, self.viewer_port)
    }
}
