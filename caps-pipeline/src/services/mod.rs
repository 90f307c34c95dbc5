//! Boundary clients used by the pipeline orchestrator
//!
//! Each boundary is a trait so the orchestrator can be driven by in-memory
//! or failing fakes in tests.

pub mod analysis_client;
pub mod notifier;
pub mod result_store;
pub mod source_client;

pub use analysis_client::{
    AnalysisClient, AnalysisError, Analyzer, ChatBackend, OpenAiChatBackend,
};
pub use notifier::{LogNotifier, NotificationError, Notifier, WebhookNotifier};
pub use result_store::{InMemoryStore, JsonFileStore, ResultStore, StoreError};
pub use source_client::{CommentSource, SourceClient, SourceError, SOURCE_TIMEOUT};
