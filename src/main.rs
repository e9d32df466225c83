use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use modelmart::browse::{browse_loop, MarketClient};
use modelmart::cli::{Cli, Commands};
use modelmart::config::Settings;
use modelmart::registry::{seed, ModelRegistry};
use modelmart::server::ApiServer;

/// Sets up file logging. The returned guard must live until exit so buffered
/// lines are flushed.
fn init_logging(settings: &Settings) -> Result<WorkerGuard> {
    let log_path = &settings.logging.directory;
    std::fs::create_dir_all(log_path)
        .with_context(|| format!("Failed to create log directory {}", log_path.display()))?;

    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        log_path,
        "modelmart.log",
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // Disable ANSI colors for cleaner log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let full_log_path = std::fs::canonicalize(log_path)?;
    info!("Log directory: {}", full_log_path.display());
    Ok(guard)
}

/// Builds the registry, loading the sample listings when configured.
fn build_registry(settings: &Settings) -> Result<Arc<ModelRegistry>> {
    let registry = ModelRegistry::new(settings.registry.defaults());
    if settings.registry.seed_samples {
        seed::load_samples(&registry).context("Failed to load sample models")?;
    }
    info!("Registry ready with {} models (in memory only, cleared on restart)", registry.len());
    Ok(Arc::new(registry))
}

fn build_client(settings: &Settings, url: Option<String>) -> Result<MarketClient> {
    MarketClient::new(
        url.unwrap_or_else(|| settings.server_url()),
        Duration::from_secs(settings.client.request_timeout_secs),
    )
}

/// Main entry point for modelmart
///
/// Handles three modes of operation:
/// - Run: Starts the registry server and an interactive browser session
/// - Serve: Starts only the registry server
/// - Browse: Starts only the browser, against an already running server
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load settings first
    let settings = match &cli.config_dir {
        Some(dir) => Settings::load(dir),
        None => Settings::new(),
    }
    .context("Failed to load configuration")?;

    let _guard = init_logging(&settings)?;
    info!("modelmart starting up...");

    match cli.command() {
        Commands::Serve => {
            let registry = build_registry(&settings)?;
            let server = ApiServer::new(registry, &settings);
            println!("Serving on {}", settings.server_url());
            server
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        Commands::Run => {
            let registry = build_registry(&settings)?;
            let server = ApiServer::new(registry, &settings);

            // Start server in a separate task
            tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    error!("Server error: {}", e);
                    eprintln!("Server error: {}", e);
                }
            });

            // Give the server a moment to start
            tokio::time::sleep(Duration::from_millis(100)).await;

            browse_loop(build_client(&settings, None)?).await?;
        }
        Commands::Browse { url } => {
            let client = build_client(&settings, url)?;
            match client.health().await {
                Ok(message) => info!("Server reachable: {}", message),
                Err(e) => {
                    eprintln!("Cannot reach server at {}: {:#}", client.base_url(), e);
                    return Err(e);
                }
            }
            browse_loop(client).await?;
        }
    }

    info!("modelmart shutting down");
    Ok(())
}
