//! Pipeline endpoint
//!
//! POST /pipeline runs one pipeline and returns its report.

use axum::{extract::State, routing::post, Json, Router};

use crate::{
    error::ApiResult,
    models::{PipelineReport, PipelineRequest},
    AppState,
};

/// POST /pipeline
///
/// Returns 200 with the report for every well-formed request, including
/// runs where the fetch, items or notification failed.
pub async fn run_pipeline(
    State(state): State<AppState>,
    Json(request): Json<PipelineRequest>,
) -> ApiResult<Json<PipelineReport>> {
    request.validate()?;

    tracing::info!(
        contact = %request.requester_contact,
        source = %request.source_label,
        "Pipeline requested"
    );

    let report = state.orchestrator.run(&request).await;
    Ok(Json(report))
}

/// Build pipeline routes
pub fn pipeline_routes() -> Router<AppState> {
    Router::new().route("/pipeline", post(run_pipeline))
}
