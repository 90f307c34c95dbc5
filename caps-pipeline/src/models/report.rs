//! Request, processed item and report types
//!
//! Field names on the wire follow the established stored-results format
//! (`original`, `analysis`, `stored`, ...) so logs written by earlier
//! deployments still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisOutcome, Sentiment};

/// Input of one pipeline run (`POST /pipeline` body)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRequest {
    /// Contact that receives the completion notification
    #[serde(rename = "email")]
    pub requester_contact: String,
    /// Free-form label copied onto every processed item
    #[serde(rename = "source")]
    pub source_label: String,
}

impl PipelineRequest {
    pub fn new(requester_contact: impl Into<String>, source_label: impl Into<String>) -> Self {
        Self {
            requester_contact: requester_contact.into(),
            source_label: source_label.into(),
        }
    }

    /// Reject requests without a usable contact
    pub fn validate(&self) -> caps_common::Result<()> {
        if self.requester_contact.trim().is_empty() {
            return Err(caps_common::Error::InvalidInput(
                "email must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One analyzed comment, as returned in the report and appended to the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedItem {
    #[serde(rename = "original")]
    pub original_text: String,
    #[serde(rename = "analysis")]
    pub summary: String,
    pub sentiment: Sentiment,
    /// False when the storage append failed
    #[serde(rename = "stored")]
    pub persisted: bool,
    #[serde(rename = "timestamp")]
    pub processed_at: DateTime<Utc>,
    #[serde(rename = "source")]
    pub source_label: String,
    /// True when the analysis came from the fallback path
    #[serde(default)]
    pub degraded: bool,
    #[serde(
        rename = "analysisError",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub analysis_error: Option<String>,
}

impl ProcessedItem {
    /// Build the item skeleton before persistence (`persisted = false`)
    pub fn from_analysis(
        original_text: impl Into<String>,
        outcome: AnalysisOutcome,
        source_label: impl Into<String>,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            summary: outcome.summary,
            sentiment: outcome.sentiment,
            persisted: false,
            processed_at,
            source_label: source_label.into(),
            degraded: outcome.degraded,
            analysis_error: outcome.failure_reason,
        }
    }
}

/// Sole output of a run
///
/// Constructed once when the run finishes and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    /// Processed items in fetch order
    pub items: Vec<ProcessedItem>,
    pub notification_sent: bool,
    pub processed_at: DateTime<Utc>,
    /// Run-level error descriptions in occurrence order
    pub errors: Vec<String>,
}

impl PipelineReport {
    pub fn new(items: Vec<ProcessedItem>, notification_sent: bool, errors: Vec<String>) -> Self {
        Self {
            items,
            notification_sent,
            processed_at: caps_common::time::now(),
            errors,
        }
    }

    /// Short-circuit report for a run whose fetch stage failed
    pub fn fetch_failed(error: impl Into<String>) -> Self {
        Self::new(Vec::new(), false, vec![error.into()])
    }

    /// Number of items whose storage append succeeded
    pub fn persisted_count(&self) -> usize {
        self.items.iter().filter(|item| item.persisted).count()
    }
}
