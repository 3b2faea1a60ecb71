use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use health_tracker_api::api::{routes::create_app, AppState};
use health_tracker_api::api::handlers::health::initialize_server_start_time;
use health_tracker_domain::database;
use health_tracker_domain::services::chat::start_cleanup_task;
use health_tracker_domain::services::ResponseCache;

/// The main entry point for the HealthTracker API server
///
/// 1. Loads `.env` and sets up tracing
/// 2. Points `DB_SQLITE_PATH` into `DATA_DIR` and opens the database pool
/// 3. Starts the cache/token cleanup task
/// 4. Serves the router until Ctrl+C or SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(true)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    info!("🚀 Starting HealthTracker API server");

    if std::env::var("JWT_SECRET").is_err() {
        warn!("JWT_SECRET is not set; login and protected routes will fail");
    }

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let db_path = PathBuf::from(&data_dir).join("healthcare.db");

    if !PathBuf::from(&data_dir).exists() {
        info!("Creating data directory: {}", data_dir);
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir))?;
    }

    if std::env::var("DB_SQLITE_PATH").is_err() {
        std::env::set_var("DB_SQLITE_PATH", db_path.to_string_lossy().to_string());
        info!("Set DB_SQLITE_PATH to {}", db_path.display());
    }

    let pool = match database::initialize_database_pool().and_then(|_| database::get_db_pool()) {
        Ok(pool) => {
            info!("Database pool initialized successfully");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database pool: {}", e);
            warn!("Falling back to in-memory storage; data will not survive a restart");
            database::create_in_memory_pool().context("failed to create in-memory database")?
        }
    };

    if let Some(details) = database::get_connection_info() {
        info!("Database: {}", details);
    }

    initialize_server_start_time();

    let cache = ResponseCache::default();
    start_cleanup_task(cache.clone());

    let state = AppState::new(pool)
        .with_chat_cache(cache)
        .with_llm_from_env();
    let app = create_app(state);

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .context("PORT must be a number")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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

    info!("Shutting down server...");
}
