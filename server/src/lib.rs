//! HTTP front-end for the data insight report generator.
//!
//! Exposes `POST /generate-report`, which accepts a multipart CSV upload and
//! returns the rendered HTML report as an attachment, and `GET /health`.
//!
//! ```rust,ignore
//! let state = web::Data::new(AppState::new(ServerConfig::default())?);
//! HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
//!     .bind(("127.0.0.1", 5000))?
//!     .run()
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod scratch;

use actix_web::web;
use data_insight::ReportGenerator;
use std::sync::Arc;

pub use config::{ServerConfig, ServerConfigBuilder, ServerConfigError};
pub use error::ApiError;
pub use scratch::{ScratchDir, ScratchRegistry};

/// State shared by all workers.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub generator: ReportGenerator,
    pub scratch: Arc<ScratchRegistry>,
}

impl AppState {
    /// Build the state, creating the scratch root if it does not exist.
    pub fn new(config: ServerConfig) -> std::io::Result<Self> {
        let scratch = ScratchRegistry::new(&config.scratch_root)?;
        Ok(Self {
            config,
            generator: ReportGenerator::default(),
            scratch,
        })
    }
}

/// Register the routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::generate_report).service(handlers::health);
}
