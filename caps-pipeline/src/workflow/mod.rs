//! Pipeline run orchestration
//!
//! One run fetches a fixed batch of comments, analyzes and persists each in
//! turn, sends one completion notification and assembles the report.

pub mod orchestrator;

pub use orchestrator::{ItemProcessingError, PipelineOrchestrator, RunState, BATCH_LIMIT};
