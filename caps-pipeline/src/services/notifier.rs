//! Completion notification
//!
//! Fire-and-forget signal keyed by the requester's contact. The default
//! sender only logs; a webhook sender stands in for an email/SMS gateway.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("gateway returned HTTP {0}")]
    Status(u16),
}

/// Completion signal boundary
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Signal `contact` that a run completed; `Ok(true)` when sent
    async fn notify(&self, contact: &str) -> Result<bool, NotificationError>;
}

/// Notifier that only writes a log line
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, contact: &str) -> Result<bool, NotificationError> {
        info!(contact = %contact, "Notification sent");
        Ok(true)
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    contact: &'a str,
}

/// Notifier posting `{"contact": ...}` to a webhook
pub struct WebhookNotifier {
    http_client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotificationError> {
        let http_client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, contact: &str) -> Result<bool, NotificationError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&WebhookPayload { contact })
            .send()
            .await
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status(status.as_u16()));
        }

        info!(contact = %contact, url = %self.url, "Notification delivered to webhook");
        Ok(true)
    }
}
