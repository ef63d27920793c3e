//! Secure in-memory to-do service.
//!
//! A single-process task list over HTTP: form + JSON endpoints for
//! creating, listing, toggling, and deleting tasks, guarded by a
//! sliding-window rate limiter, HMAC-verified CSRF tokens, input
//! sanitization, and a fixed set of security response headers. State lives
//! in process memory only; a restart starts empty.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use todo_service::config::loader;
use todo_service::config::schema::DEV_SESSION_SECRET;
use todo_service::config::watcher::watch_config;
use todo_service::http::HttpServer;
use todo_service::lifecycle::Shutdown;
use todo_service::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "todo-service", about = "In-memory to-do list over HTTP")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply without one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => loader::load_config(path)?,
        None => loader::default_config()?,
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );
    if config.security.session_secret == DEV_SESSION_SECRET {
        tracing::warn!("Using the built-in development session secret; set SESSION_SECRET");
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Hot reload only applies when a config file is in play; the watcher
    // must outlive the server for events to fire.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, rx) = watch_config(path)?;
            (Some(watcher), rx)
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server
        .run(listener, config_updates, shutdown.listener())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
