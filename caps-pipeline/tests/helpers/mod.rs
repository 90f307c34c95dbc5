//! Test Helper Utilities
//!
//! Fake boundary implementations and a local HTTP stub server shared by the
//! caps-pipeline integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use caps_pipeline::models::{AnalysisOutcome, ProcessedItem, RawComment, Sentiment};
use caps_pipeline::services::{
    Analyzer, CommentSource, InMemoryStore, NotificationError, Notifier, ResultStore, SourceError,
};
use caps_pipeline::PipelineOrchestrator;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Source returning a fixed batch (or a fixed error)
pub struct FakeSource {
    result: Mutex<Option<Result<Vec<RawComment>, SourceError>>>,
    pub requested_limits: Mutex<Vec<usize>>,
}

impl FakeSource {
    pub fn with_comments(comments: Vec<RawComment>) -> Self {
        Self {
            result: Mutex::new(Some(Ok(comments))),
            requested_limits: Mutex::new(Vec::new()),
        }
    }

    pub fn with_texts(texts: &[&str]) -> Self {
        Self::with_comments(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| RawComment::new(*text, json!(i + 1)))
                .collect(),
        )
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            result: Mutex::new(Some(Err(error))),
            requested_limits: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommentSource for FakeSource {
    async fn fetch_batch(&self, limit: usize) -> Result<Vec<RawComment>, SourceError> {
        self.requested_limits.lock().unwrap().push(limit);
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Analyzer behaviour per call
#[derive(Clone)]
pub enum AnalyzerMode {
    /// Echo-style success: summary "summary: <text>"
    Succeed(Sentiment),
    /// Capability failure, degraded outcome with this reason
    Degrade(String),
    /// Panic inside the analyzer
    Panic,
}

pub struct FakeAnalyzer {
    mode: AnalyzerMode,
    pub calls: AtomicUsize,
    pub texts: Mutex<Vec<String>>,
}

impl FakeAnalyzer {
    pub fn new(mode: AnalyzerMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Analyzer for FakeAnalyzer {
    async fn analyze(&self, text: &str) -> AnalysisOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());
        match &self.mode {
            AnalyzerMode::Succeed(sentiment) => {
                AnalysisOutcome::success(format!("summary: {}", text), *sentiment)
            }
            AnalyzerMode::Degrade(reason) => AnalysisOutcome::degraded(reason.clone()),
            AnalyzerMode::Panic => panic!("analyzer exploded"),
        }
    }
}

/// Store that records attempts and rejects the listed call indexes
pub struct FlakyStore {
    inner: InMemoryStore,
    fail_on: Vec<usize>,
    pub attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            inner: InMemoryStore::new(),
            fail_on,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_on((0..64).collect())
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultStore for FlakyStore {
    async fn append(&self, item: &ProcessedItem) -> bool {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&attempt) {
            return false;
        }
        self.inner.append(item).await
    }

    async fn load_all(&self) -> Vec<ProcessedItem> {
        self.inner.load_all().await
    }
}

/// Notifier that succeeds or fails and records contacts
pub struct FakeNotifier {
    fail: bool,
    pub contacts: Mutex<Vec<String>>,
}

impl FakeNotifier {
    pub fn ok() -> Self {
        Self {
            fail: false,
            contacts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            contacts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.contacts.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, contact: &str) -> Result<bool, NotificationError> {
        self.contacts.lock().unwrap().push(contact.to_string());
        if self.fail {
            Err(NotificationError::Status(502))
        } else {
            Ok(true)
        }
    }
}

/// Handles to every fake wired into an orchestrator
pub struct Harness {
    pub source: Arc<FakeSource>,
    pub analyzer: Arc<FakeAnalyzer>,
    pub store: Arc<dyn ResultStore>,
    pub notifier: Arc<FakeNotifier>,
    pub orchestrator: PipelineOrchestrator,
}

impl Harness {
    pub fn new(
        source: FakeSource,
        analyzer: FakeAnalyzer,
        store: Arc<dyn ResultStore>,
        notifier: FakeNotifier,
    ) -> Self {
        let source = Arc::new(source);
        let analyzer = Arc::new(analyzer);
        let notifier = Arc::new(notifier);
        let orchestrator = PipelineOrchestrator::new(
            source.clone(),
            analyzer.clone(),
            store.clone(),
            notifier.clone(),
        );
        Self {
            source,
            analyzer,
            store,
            notifier,
            orchestrator,
        }
    }
}

/// Serve `router` on an ephemeral localhost port, returning its address
pub async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// jsonplaceholder-style comment objects
pub fn sample_comments(count: usize) -> serde_json::Value {
    let comments: Vec<serde_json::Value> = (1..=count)
        .map(|id| {
            json!({
                "postId": 1,
                "id": id,
                "name": format!("comment {}", id),
                "email": format!("user{}@example.com", id),
                "body": format!("body of comment {}", id),
            })
        })
        .collect();
    serde_json::Value::Array(comments)
}
