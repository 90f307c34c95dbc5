//! Data model for pipeline runs
//!
//! Request, per-item and report types shared by the orchestrator, the
//! boundary clients and the HTTP layer.

pub mod analysis;
pub mod comment;
pub mod report;

pub use analysis::{AnalysisOutcome, Sentiment, DEGRADED_SUMMARY};
pub use comment::RawComment;
pub use report::{PipelineReport, PipelineRequest, ProcessedItem};
