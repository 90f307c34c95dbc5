//! caps-pipeline - Comment Analysis Pipeline Service
//!
//! Fetches a small batch of comments, classifies each with a chat-completion
//! model, appends the results to a JSON log and notifies the requester.
//!
//! `serve` (default) exposes `POST /pipeline`; `run` executes one pipeline
//! from the command line and prints the report.

use anyhow::{Context, Result};
use caps_common::config::{load_toml_config, resolve_config_path, TomlConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use caps_pipeline::config::CONFIG_PATH_ENV;
use caps_pipeline::models::PipelineRequest;
use caps_pipeline::services::{InMemoryStore, JsonFileStore, ResultStore};
use caps_pipeline::{build_orchestrator, build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "caps-pipeline", version, about = "Comment analysis pipeline service")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// HTTP port (overrides config)
    #[arg(long, env = "CAPS_PORT", global = true)]
    port: Option<u16>,

    /// Stored results log path (overrides config)
    #[arg(long, env = "CAPS_STORE_PATH", global = true)]
    store_path: Option<PathBuf>,

    /// Keep results in memory instead of the JSON log
    #[arg(long, global = true)]
    memory_store: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Execute one pipeline run and print the report as JSON
    Run {
        /// Contact notified when the run completes
        #[arg(long)]
        email: String,
        /// Label stored with every processed item
        #[arg(long, default_value = "cli")]
        source: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref(), CONFIG_PATH_ENV);
    let mut config = load_toml_config(config_path.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(path) = &cli.store_path {
        config.store_path = Some(path.clone());
    }

    init_tracing(&config);

    info!(
        "Starting caps-pipeline v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("Configuration: built-in defaults"),
    }

    let store: Arc<dyn ResultStore> = if cli.memory_store {
        info!("Result store: in-memory");
        Arc::new(InMemoryStore::new())
    } else {
        let path = config.resolved_store_path();
        info!("Result store: {}", path.display());
        Arc::new(JsonFileStore::new(path))
    };

    let orchestrator = Arc::new(build_orchestrator(&config, store)?);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, orchestrator).await,
        Command::Run { email, source } => {
            let request = PipelineRequest::new(email, source);
            request.validate()?;
            let report = orchestrator.run(&request).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

async fn serve(
    config: &TomlConfig,
    orchestrator: Arc<caps_pipeline::PipelineOrchestrator>,
) -> Result<()> {
    let state = AppState::new(orchestrator);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn init_tracing(config: &TomlConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    // Logs go to stderr so `run` keeps stdout for the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
