//! Analysis results produced per comment

use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary used whenever the analysis capability could not produce one
pub const DEGRADED_SUMMARY: &str = "AI processing failed.";

/// Sentiment label, constrained to three values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Enthusiastic,
    Critical,
    /// Also the fallback label for degraded outcomes
    #[default]
    Objective,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Enthusiastic => "enthusiastic",
            Sentiment::Critical => "critical",
            Sentiment::Objective => "objective",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing one comment
///
/// A degraded outcome is never dropped; it only marks the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub summary: String,
    pub sentiment: Sentiment,
    pub degraded: bool,
    pub failure_reason: Option<String>,
}

impl AnalysisOutcome {
    /// Outcome produced by the live capability
    pub fn success(summary: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            summary: summary.into(),
            sentiment,
            degraded: false,
            failure_reason: None,
        }
    }

    /// Fallback outcome carrying the captured error text
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            summary: DEGRADED_SUMMARY.to_string(),
            sentiment: Sentiment::Objective,
            degraded: true,
            failure_reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Enthusiastic).unwrap(),
            "\"enthusiastic\""
        );
        let parsed: Sentiment = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Sentiment::Critical);
    }

    #[test]
    fn test_sentiment_rejects_unknown_label() {
        assert!(serde_json::from_str::<Sentiment>("\"angry\"").is_err());
        assert!(serde_json::from_str::<Sentiment>("\"Critical\"").is_err());
    }

    #[test]
    fn test_degraded_outcome_shape() {
        let outcome = AnalysisOutcome::degraded("connection refused");
        assert_eq!(outcome.summary, DEGRADED_SUMMARY);
        assert_eq!(outcome.sentiment, Sentiment::Objective);
        assert!(outcome.degraded);
        assert_eq!(outcome.failure_reason.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_success_outcome_not_degraded() {
        let outcome = AnalysisOutcome::success("Nice.", Sentiment::Enthusiastic);
        assert!(!outcome.degraded);
        assert!(outcome.failure_reason.is_none());
    }
}
