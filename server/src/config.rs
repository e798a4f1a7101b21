//! Server configuration.
//!
//! Values come from command-line flags or the environment (`HOST`, `PORT`,
//! `DEBUG`, `TEMPLATES_DIR`, `SCRATCH_DIR`, `MAX_UPLOAD_BYTES`, `WORKERS`) and
//! are assembled through [`ServerConfig::builder()`].

use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Runtime configuration of the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Raises the default log level to `debug`.
    pub debug: bool,
    /// Number of HTTP workers; `None` lets actix pick one per core.
    pub workers: Option<usize>,
    /// Directory searched for templates referenced by name.
    pub templates_dir: PathBuf,
    /// Parent directory of per-request scratch directories.
    pub scratch_root: PathBuf,
    /// Upper bound on the total size of an upload.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            workers: None,
            templates_dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            scratch_root: std::env::temp_dir().join("data-insight"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), ServerConfigError> {
        if self.host.trim().is_empty() {
            return Err(ServerConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ServerConfigError::InvalidPort);
        }
        if self.workers == Some(0) {
            return Err(ServerConfigError::InvalidWorkers);
        }
        if self.max_upload_bytes == 0 {
            return Err(ServerConfigError::InvalidUploadLimit);
        }
        Ok(())
    }

    /// `host:port` string for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    #[error("Host must not be empty")]
    EmptyHost,

    #[error("Port must be between 1 and 65535")]
    InvalidPort,

    #[error("Worker count must be at least 1")]
    InvalidWorkers,

    #[error("Maximum upload size must be at least 1 byte")]
    InvalidUploadLimit,
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    debug: Option<bool>,
    workers: Option<usize>,
    templates_dir: Option<PathBuf>,
    scratch_root: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    pub fn scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(dir.into());
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ServerConfig, ServerConfigError> {
        let defaults = ServerConfig::default();
        let config = ServerConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            debug: self.debug.unwrap_or(defaults.debug),
            workers: self.workers.or(defaults.workers),
            templates_dir: self.templates_dir.unwrap_or(defaults.templates_dir),
            scratch_root: self.scratch_root.unwrap_or(defaults.scratch_root),
            max_upload_bytes: self.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
        };
        config.validate()?;
        Ok(config)
    }
}
