//! Configuration resolution for caps-pipeline
//!
//! Provides multi-tier API key resolution with ENV → TOML priority.

use caps_common::config::TomlConfig;
use tracing::{info, warn};

/// Service-specific environment variable (highest priority)
pub const API_KEY_ENV: &str = "CAPS_OPENAI_API_KEY";

/// Conventional OpenAI environment variable
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "CAPS_CONFIG";

/// Resolve the analysis API key
///
/// **Priority:** `CAPS_OPENAI_API_KEY` → `OPENAI_API_KEY` → TOML `analysis.api_key`
///
/// Returns `None` when no valid key is configured. That is not fatal: every
/// analysis then degrades with an "API key not configured" reason.
pub fn resolve_analysis_api_key(toml_config: &TomlConfig) -> Option<String> {
    let candidates = [
        (API_KEY_ENV, std::env::var(API_KEY_ENV).ok()),
        (OPENAI_API_KEY_ENV, std::env::var(OPENAI_API_KEY_ENV).ok()),
        ("TOML", toml_config.analysis.api_key.clone()),
    ];

    let valid: Vec<(&str, String)> = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)))
        .collect();

    // Warn if multiple sources (potential misconfiguration)
    if valid.len() > 1 {
        let sources: Vec<&str> = valid.iter().map(|(source, _)| *source).collect();
        warn!(
            "Analysis API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match valid.into_iter().next() {
        Some((source, key)) => {
            info!("Analysis API key loaded from {}", source);
            Some(key)
        }
        None => {
            warn!(
                "Analysis API key not configured; every item will be marked degraded. \
                 Set {} or {}, or analysis.api_key in the TOML config.",
                API_KEY_ENV, OPENAI_API_KEY_ENV
            );
            None
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
