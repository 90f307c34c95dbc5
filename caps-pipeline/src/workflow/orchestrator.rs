//! Pipeline Orchestrator
//!
//! Runs one end-to-end pipeline: fetch → (analyze → persist)* → notify → report.
//!
//! # Error Handling
//! - Fetch failure is the only early exit: the report carries no items and a
//!   single `"API fetch failed: ..."` error, and nothing else runs.
//! - Analysis failure degrades the item (handled inside the analyzer).
//! - Storage failure marks the item `persisted = false`.
//! - Any other per-item failure (malformed record, panic in a boundary) drops
//!   that item and records `"Processing error: ..."`.
//! - Notification failure records `"Notification error: ..."`.
//!
//! Nothing is retried. Items are processed strictly sequentially in fetch order.

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::models::{PipelineReport, PipelineRequest, ProcessedItem, RawComment};
use crate::services::{Analyzer, CommentSource, Notifier, ResultStore};

/// Number of comments requested per run
pub const BATCH_LIMIT: usize = 3;

/// Run states, strictly sequential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Fetching,
    Analyzing,
    Persisting,
    Notifying,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Start => "start",
            RunState::Fetching => "fetching",
            RunState::Analyzing => "analyzing",
            RunState::Persisting => "persisting",
            RunState::Notifying => "notifying",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Failure that drops a single item from the report
#[derive(Debug, Error)]
pub enum ItemProcessingError {
    #[error("record {0} has no text body")]
    MalformedRecord(String),

    #[error("{stage} panicked: {message}")]
    Panicked { stage: RunState, message: String },
}

/// Composes source, analyzer, store and notifier into one run
///
/// Holds no per-run state, so one instance serves concurrent runs.
pub struct PipelineOrchestrator {
    source: Arc<dyn CommentSource>,
    analyzer: Arc<dyn Analyzer>,
    store: Arc<dyn ResultStore>,
    notifier: Arc<dyn Notifier>,
}

impl PipelineOrchestrator {
    pub fn new(
        source: Arc<dyn CommentSource>,
        analyzer: Arc<dyn Analyzer>,
        store: Arc<dyn ResultStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            analyzer,
            store,
            notifier,
        }
    }

    /// Execute one run. Always returns a well-formed report.
    pub async fn run(&self, request: &PipelineRequest) -> PipelineReport {
        let run_id = Uuid::new_v4();
        self.execute(request)
            .instrument(info_span!("pipeline_run", run_id = %run_id))
            .await
    }

    async fn execute(&self, request: &PipelineRequest) -> PipelineReport {
        enter(RunState::Start);
        info!(source = %request.source_label, "Pipeline run started");

        enter(RunState::Fetching);
        let comments = match self.source.fetch_batch(BATCH_LIMIT).await {
            Ok(comments) => comments,
            Err(e) => {
                error!(error = %e, "Comment fetch failed, aborting run");
                enter(RunState::Done);
                return PipelineReport::fetch_failed(format!("API fetch failed: {}", e));
            }
        };

        let mut items = Vec::with_capacity(comments.len().min(BATCH_LIMIT));
        let mut errors = Vec::new();

        for (index, comment) in comments.iter().take(BATCH_LIMIT).enumerate() {
            match self.process_item(comment, &request.source_label).await {
                Ok(item) => {
                    debug!(
                        item_index = index,
                        persisted = item.persisted,
                        degraded = item.degraded,
                        "Item processed"
                    );
                    items.push(item);
                }
                Err(e) => {
                    warn!(item_index = index, error = %e, "Item skipped");
                    errors.push(format!("Processing error: {}", e));
                }
            }
        }

        enter(RunState::Notifying);
        let notification_sent = match self.notify(&request.requester_contact).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(error = %e, "Notification failed");
                errors.push(format!("Notification error: {}", e));
                false
            }
        };

        let report = PipelineReport::new(items, notification_sent, errors);
        enter(RunState::Done);

        info!(
            items = report.items.len(),
            persisted = report.persisted_count(),
            errors = report.errors.len(),
            notification_sent = report.notification_sent,
            "Pipeline run finished"
        );

        report
    }

    async fn process_item(
        &self,
        comment: &RawComment,
        source_label: &str,
    ) -> Result<ProcessedItem, ItemProcessingError> {
        let text = comment.body.as_deref().ok_or_else(|| {
            ItemProcessingError::MalformedRecord(comment.source_identifier.to_string())
        })?;

        enter(RunState::Analyzing);
        let outcome = AssertUnwindSafe(self.analyzer.analyze(text))
            .catch_unwind()
            .await
            .map_err(|payload| panicked(RunState::Analyzing, payload))?;

        let mut item =
            ProcessedItem::from_analysis(text, outcome, source_label, caps_common::time::now());

        enter(RunState::Persisting);
        item.persisted = AssertUnwindSafe(self.store.append(&item))
            .catch_unwind()
            .await
            .map_err(|payload| panicked(RunState::Persisting, payload))?;

        Ok(item)
    }

    async fn notify(&self, contact: &str) -> Result<bool, String> {
        match AssertUnwindSafe(self.notifier.notify(contact))
            .catch_unwind()
            .await
        {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(payload) => Err(panicked(RunState::Notifying, payload).to_string()),
        }
    }
}

fn enter(state: RunState) {
    debug!(state = %state, "Run state");
}

fn panicked(stage: RunState, payload: Box<dyn Any + Send>) -> ItemProcessingError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ItemProcessingError::Panicked { stage, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_state_names() {
        assert_eq!(RunState::Fetching.to_string(), "fetching");
        assert_eq!(RunState::Done.to_string(), "done");
    }

    #[test]
    fn test_malformed_record_message() {
        let err = ItemProcessingError::MalformedRecord(json!(12).to_string());
        assert_eq!(err.to_string(), "record 12 has no text body");
    }

    #[test]
    fn test_panic_payload_str() {
        let err = panicked(RunState::Analyzing, Box::new("boom"));
        assert_eq!(err.to_string(), "analyzing panicked: boom");
    }

    #[test]
    fn test_panic_payload_string() {
        let err = panicked(RunState::Persisting, Box::new(String::from("disk gone")));
        assert_eq!(err.to_string(), "persisting panicked: disk gone");
    }

    #[test]
    fn test_panic_payload_other() {
        let err = panicked(RunState::Notifying, Box::new(42_u8));
        assert_eq!(err.to_string(), "notifying panicked: unknown panic");
    }
}
