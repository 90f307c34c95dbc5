//! Remote comment source client
//!
//! Fetches a bounded batch of raw comments from a JSON collection endpoint
//! (jsonplaceholder-style: a top-level array of objects with `id` and `body`).
//!
//! The request has a hard 5 second timeout and is attempted exactly once.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::RawComment;

/// Bounded wait for the source fetch
pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

const USER_AGENT: &str = concat!("caps-pipeline/", env!("CARGO_PKG_VERSION"));

/// Source client errors
///
/// Every variant means the source is unavailable for this run.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("source returned HTTP {0}")]
    Status(u16),

    #[error("unexpected response body: {0}")]
    InvalidBody(String),
}

/// Boundary that yields the raw comments of one run
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch at most `limit` comments, first `limit` in returned order
    async fn fetch_batch(&self, limit: usize) -> Result<Vec<RawComment>, SourceError>;
}

/// HTTP client for the remote comment collection
pub struct SourceClient {
    http_client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl SourceClient {
    /// Create client for `url` with the standard 5 second timeout
    pub fn new(url: impl Into<String>) -> Result<Self, SourceError> {
        Self::with_timeout(url, SOURCE_TIMEOUT)
    }

    /// Create client with an explicit timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_request_error(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(self.timeout)
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl CommentSource for SourceClient {
    async fn fetch_batch(&self, limit: usize) -> Result<Vec<RawComment>, SourceError> {
        debug!(url = %self.url, limit, "Fetching comment batch");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(self.timeout)
                } else {
                    SourceError::InvalidBody(e.to_string())
                }
            })?;

        let elements = match body {
            Value::Array(elements) => elements,
            other => {
                return Err(SourceError::InvalidBody(format!(
                    "expected JSON array, got {}",
                    json_kind(&other)
                )))
            }
        };

        let total = elements.len();
        let comments: Vec<RawComment> = elements
            .iter()
            .take(limit)
            .map(RawComment::from_json)
            .collect();

        info!(
            received = total,
            kept = comments.len(),
            "Comment batch fetched"
        );

        Ok(comments)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = SourceClient::new("http://localhost/comments").unwrap();
        assert_eq!(client.url(), "http://localhost/comments");
        assert_eq!(client.timeout, SOURCE_TIMEOUT);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SourceError::Status(503).to_string(), "source returned HTTP 503");
        assert_eq!(
            SourceError::Timeout(Duration::from_secs(5)).to_string(),
            "request timed out after 5s"
        );
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!({"a": 1})), "object");
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([])), "array");
    }
}
