//! Bootstrap configuration loading and data folder resolution
//!
//! Configuration file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/caps/caps-pipeline.toml`)
//! 4. Built-in defaults (no file)
//!
//! The TOML file is bootstrap only: it is read once at startup and the
//! service must restart to pick up changes.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name used under the platform config/data directories
pub const APP_DIR_NAME: &str = "caps";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "caps-pipeline.toml";

/// Default file name of the stored results log
pub const STORE_FILE_NAME: &str = "stored_results.json";

/// Default HTTP port for caps-pipeline
pub const DEFAULT_PORT: u16 = 5740;

/// Default remote comment collection
pub const DEFAULT_SOURCE_URL: &str = "https://jsonplaceholder.typicode.com/comments?postId=1";

/// Default OpenAI-compatible API base URL
pub const DEFAULT_ANALYSIS_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat completion model
pub const DEFAULT_ANALYSIS_MODEL: &str = "gpt-4o-mini";

/// Bootstrap configuration loaded from TOML file
///
/// Every field has a built-in default, so an empty file (or no file at all)
/// yields a runnable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Bind address for the HTTP server
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the stored results log (JSON array file)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Remote comment source
    #[serde(default)]
    pub source: SourceConfig,

    /// Text analysis capability
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Completion notification
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote comment source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Collection URL (already carries its fixed filter)
    #[serde(default = "default_source_url")]
    pub url: String,
}

/// Text analysis (chat completion) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// OpenAI-compatible API base URL (without `/chat/completions`)
    #[serde(default = "default_analysis_base_url")]
    pub base_url: String,

    /// Model name sent with every request
    #[serde(default = "default_analysis_model")]
    pub model: String,

    /// API key (lowest priority; environment variables win)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_analysis_timeout_secs")]
    pub timeout_secs: u64,
}

/// Notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook receiving `{"contact": ...}` per run. Log-only when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_source_url() -> String {
    DEFAULT_SOURCE_URL.to_string()
}

fn default_analysis_base_url() -> String {
    DEFAULT_ANALYSIS_BASE_URL.to_string()
}

fn default_analysis_model() -> String {
    DEFAULT_ANALYSIS_MODEL.to_string()
}

fn default_analysis_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store_path: None,
            source: SourceConfig::default(),
            analysis: AnalysisConfig::default(),
            notification: NotificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: default_analysis_base_url(),
            model: default_analysis_model(),
            api_key: None,
            timeout_secs: default_analysis_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Effective store path: configured value or the platform data folder default
    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| default_data_folder().join(STORE_FILE_NAME))
    }
}

/// Resolve which configuration file to read, if any
///
/// Returns `None` when neither the CLI argument, the environment variable,
/// nor the platform default file points at anything.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    let default_path = dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))?;
    if default_path.exists() {
        Some(default_path)
    } else {
        debug!("No config file at {}", default_path.display());
        None
    }
}

/// Load the bootstrap configuration
///
/// `None` yields built-in defaults. An explicitly named file that cannot be
/// read or parsed is an error: silently ignoring it would hide typos.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No configuration file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Get OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./caps_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = TomlConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.analysis.model, "gpt-4o-mini");
        assert_eq!(config.analysis.timeout_secs, 30);
        assert!(config.analysis.api_key.is_none());
        assert!(config.notification.webhook_url.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.analysis.base_url, DEFAULT_ANALYSIS_BASE_URL);
    }

    #[test]
    fn test_partial_sections_keep_field_defaults() {
        let config: TomlConfig = toml::from_str(
            r#"
            port = 8080

            [analysis]
            model = "gpt-4o"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.analysis.model, "gpt-4o");
        assert_eq!(config.analysis.timeout_secs, 30);
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_store_path_override() {
        let config = TomlConfig {
            store_path: Some(PathBuf::from("/tmp/results.json")),
            ..TomlConfig::default()
        };
        assert_eq!(config.resolved_store_path(), PathBuf::from("/tmp/results.json"));
    }

    #[test]
    fn test_store_path_default_file_name() {
        let config = TomlConfig::default();
        assert!(config.resolved_store_path().ends_with(STORE_FILE_NAME));
    }
}
