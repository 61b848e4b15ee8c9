//! briefing-api - Briefing generator service
//!
//! Turns client conversations into structured briefings through a hosted
//! completion model and keeps them per user in SQLite.

use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use briefing_common::completion::HttpCompletionClient;
use briefing_common::config::{
    load_toml_config, resolve_api_key, resolve_root_folder, LoggingConfig, RootFolderInitializer,
};
use briefing_common::db::init_database;
use briefing_common::extract::{Extractor, ExtractorSettings};
use briefing_api::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for briefing-api
#[derive(Parser, Debug)]
#[command(name = "briefing-api")]
#[command(about = "Briefing generator HTTP service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5810", env = "BRIEFING_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1", env = "BRIEFING_BIND")]
    bind: String,

    /// Root folder holding the database
    #[arg(short, long, env = "BRIEFING_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "BRIEFING_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    // Build identification first, before any database work
    info!(
        "Starting briefing-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config
        .completion
        .validate()
        .context("Invalid [completion] configuration")?;

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database ready: {}", db_path.display());

    let api_key = resolve_api_key(&config.completion)?;
    let client = HttpCompletionClient::new(
        &config.completion.base_url,
        api_key,
        config.completion.timeout(),
    )
    .context("Failed to build completion client")?;
    info!(
        endpoint = client.endpoint(),
        model = %config.completion.model,
        policy = ?config.extraction.missing_field_policy,
        "Completion client configured"
    );

    let settings =
        ExtractorSettings::from_config(&config.completion, config.extraction.missing_field_policy);
    let extractor = Extractor::new(Arc::new(client), settings);

    let state = AppState::new(pool, extractor);
    let app = build_router(state, &config.server.cors_origins);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.bind, args.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("briefing-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing
///
/// `RUST_LOG` overrides the configured level. With `[logging] file` set, output
/// is appended to that file instead of stderr.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", logging.level)));

    let (stderr_layer, file_layer) = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (Some(tracing_subscriber::fmt::layer()), None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
