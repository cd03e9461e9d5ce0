//! `collegd`, the college records server.
//!
//! Usage:
//!   collegd [-c <context-name-or-path>] [--listen <addr>]
//!
//! A context name resolves to `/etc/college/<name>.toml`. Without `-c` the
//! built-in defaults are used.

mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use college_core::Module;
use tracing::{info, warn};

use config::ServerConfig;

/// College records server.
#[derive(Parser, Debug)]
#[command(name = "collegd", about = "College records server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Listen address (overrides the config file and default 0.0.0.0:8080).
    #[arg(long = "listen", env = "LISTEN")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let server_config = match &cli.config {
        Some(name) => {
            let path = ServerConfig::resolve_path(name);
            info!("Loading configuration from {}", path.display());
            ServerConfig::load(&path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            ServerConfig::default()
        }
    };

    let listen = server_config.listen_addr(cli.listen.as_deref());
    let core_config = server_config.service_config(listen.clone());

    // Initialize storage.
    std::fs::create_dir_all(&server_config.storage.data_dir)?;
    let sqlite_path = core_config.resolve_sqlite_path();
    let sql: Arc<dyn college_sql::SQLStore> = Arc::new(
        college_sql::SqliteStore::open(&sqlite_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    info!("SQL store opened at {}", sqlite_path.display());

    let academic_module = academic::AcademicModule::new(Arc::clone(&sql), &core_config)?;
    info!(
        max_code_attempts = core_config.max_code_attempts,
        "Academic module initialized"
    );

    let module_routes = vec![(academic_module.name(), academic_module.routes())];
    let app = routes::build_router(module_routes, &server_config.cors);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!("College server listening on {}", listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
