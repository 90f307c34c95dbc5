//! caps-pipeline library interface
//!
//! Exposes the pipeline components, the router and the wiring helpers used
//! by the binary and by integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};
pub use crate::workflow::PipelineOrchestrator;

use axum::Router;
use caps_common::config::TomlConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::services::{
    AnalysisClient, LogNotifier, Notifier, OpenAiChatBackend, ResultStore, SourceClient,
    WebhookNotifier,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator shared by all concurrent runs
    pub orchestrator: Arc<PipelineOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(orchestrator: Arc<PipelineOrchestrator>) -> Self {
        Self {
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::pipeline_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Wire the production boundary clients from configuration
///
/// The store is passed in so callers choose between the JSON file log and an
/// in-memory store.
pub fn build_orchestrator(
    config: &TomlConfig,
    store: Arc<dyn ResultStore>,
) -> caps_common::Result<PipelineOrchestrator> {
    let source = SourceClient::new(config.source.url.clone())
        .map_err(|e| caps_common::Error::Config(format!("Source client: {}", e)))?;
    info!("Comment source: {}", source.url());

    let api_key = config::resolve_analysis_api_key(config);
    let backend = OpenAiChatBackend::new(
        &config.analysis.base_url,
        config.analysis.model.clone(),
        api_key,
        Duration::from_secs(config.analysis.timeout_secs),
    )
    .map_err(|e| caps_common::Error::Config(format!("Analysis backend: {}", e)))?;
    info!(
        "Analysis: {} (model {})",
        backend.endpoint(),
        config.analysis.model
    );

    let notifier: Arc<dyn Notifier> = match &config.notification.webhook_url {
        Some(url) => {
            info!("Notifications: webhook {}", url);
            Arc::new(
                WebhookNotifier::new(url.clone())
                    .map_err(|e| caps_common::Error::Config(format!("Notifier: {}", e)))?,
            )
        }
        None => {
            info!("Notifications: log only");
            Arc::new(LogNotifier)
        }
    };

    Ok(PipelineOrchestrator::new(
        Arc::new(source),
        Arc::new(AnalysisClient::new(Arc::new(backend))),
        store,
        notifier,
    ))
}
