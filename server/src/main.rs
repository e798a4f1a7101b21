//! Server entry point.

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use anyhow::{Context, Result};
use clap::Parser;
use data_insight_server::{AppState, ServerConfig, configure};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    author = "Data Insight Team",
    version,
    about = "HTTP server that turns uploaded CSV files into HTML reports",
    long_about = "Serves POST /generate-report (multipart fields 'dataset' and optional\n\
                  'template') and GET /health.\n\n\
                  Every option can also be set through the environment or a .env file."
)]
struct Args {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = data_insight_server::config::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = data_insight_server::config::DEFAULT_PORT)]
    port: u16,

    /// Debug mode (verbose logging); DEBUG=1 enables it
    #[arg(long, env = "DEBUG", action = clap::ArgAction::Set, value_parser = parse_flag, default_value = "0")]
    debug: bool,

    /// Number of worker threads (defaults to one per core)
    #[arg(long, env = "WORKERS")]
    workers: Option<usize>,

    /// Directory with templates selectable by name
    #[arg(long, env = "TEMPLATES_DIR", default_value = data_insight_server::config::DEFAULT_TEMPLATES_DIR)]
    templates_dir: PathBuf,

    /// Parent directory for per-request scratch directories
    #[arg(long, env = "SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,

    /// Maximum upload size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = data_insight_server::config::DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(format!("expected 0 or 1, got '{}'", other)),
    }
}

/// Initialize the tracing subscriber for logging.
fn init_logging(debug: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: Args) -> Result<ServerConfig> {
    let mut builder = ServerConfig::builder()
        .host(args.host)
        .port(args.port)
        .debug(args.debug)
        .templates_dir(args.templates_dir)
        .max_upload_bytes(args.max_upload_bytes);
    if let Some(workers) = args.workers {
        builder = builder.workers(workers);
    }
    if let Some(dir) = args.scratch_dir {
        builder = builder.scratch_root(dir);
    }
    Ok(builder.build()?)
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();
    init_logging(args.debug);

    let config = build_config(args)?;
    let state = web::Data::new(AppState::new(config.clone()).with_context(|| {
        format!(
            "Creating scratch root {}",
            config.scratch_root.display()
        )
    })?);
    let registry = state.scratch.clone();

    info!(
        "Listening on http://{} (templates: {}, scratch: {})",
        config.address(),
        config.templates_dir.display(),
        config.scratch_root.display()
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(configure)
    });
    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    let result = server.bind((config.host.as_str(), config.port))?.run().await;

    let swept = registry.sweep();
    if swept > 0 {
        info!("Removed {} leftover scratch directories", swept);
    }

    result.context("HTTP server failed")
}
