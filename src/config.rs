//! Board configuration.
//!
//! Settings come from an optional TOML file, then environment variables
//! (after loading `.env` if present) override individual keys. Defaults
//! match the backend's stock deployment: local endpoint, one-minute poll,
//! fifteen-second request timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::logging::LogLevel;
use crate::model::{BoardError, Tab};
use crate::window::Window;

// ---------------------------------------------------------------------------
// Environment keys
// ---------------------------------------------------------------------------

pub const ENV_ENDPOINT: &str = "WINDBOARD_ENDPOINT";
pub const ENV_WINDOW: &str = "WINDBOARD_WINDOW";
pub const ENV_TAB: &str = "WINDBOARD_TAB";
pub const ENV_POLL_INTERVAL: &str = "WINDBOARD_POLL_INTERVAL_SECS";
pub const ENV_TIMEOUT: &str = "WINDBOARD_TIMEOUT_SECS";
pub const ENV_OUTPUT: &str = "WINDBOARD_OUTPUT";
pub const ENV_LOG_LEVEL: &str = "WINDBOARD_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "WINDBOARD_LOG_FILE";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Base URL of the backend serving `/api/data`.
    pub endpoint: String,
    pub window: Window,
    pub tab: Tab,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Where the rendered page is written; `None` disables the HTML surface.
    pub output_html: Option<PathBuf>,
    pub log_level: String,
    pub log_file: Option<String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000".to_string(),
            window: Window::Now,
            tab: Tab::AverageWind,
            poll_interval_secs: 60,
            request_timeout_secs: 15,
            output_html: Some(PathBuf::from("board.html")),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl BoardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn min_log_level(&self) -> Result<LogLevel, BoardError> {
        self.log_level.parse()
    }

    /// One-line description of the effective settings, for the startup log.
    pub fn summary(&self) -> String {
        let output = self
            .output_html
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "off".to_string());
        format!(
            "endpoint={} window={} tab={} poll={}s timeout={}s html={} log={}",
            self.endpoint,
            self.window.id(),
            self.tab.id(),
            self.poll_interval_secs,
            self.request_timeout_secs,
            output,
            self.log_level
        )
    }

    /// Rejects settings the poll loop cannot run with.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.poll_interval_secs == 0 {
            return Err(BoardError::ConfigError(
                "poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.endpoint.trim().is_empty() {
            return Err(BoardError::ConfigError("endpoint must not be empty".to_string()));
        }
        self.min_log_level()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses a TOML document. Missing keys take their defaults.
pub fn parse_config(toml_text: &str) -> Result<BoardConfig, BoardError> {
    toml::from_str(toml_text).map_err(|e| BoardError::ConfigError(e.to_string()))
}

/// Applies overrides from `lookup`, usually the process environment.
///
/// Empty values are ignored. A numeric key that does not parse is an error
/// rather than a silent fallback.
pub fn apply_overrides<F>(mut config: BoardConfig, lookup: F) -> Result<BoardConfig, BoardError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = get(ENV_ENDPOINT) {
        config.endpoint = v;
    }
    if let Some(v) = get(ENV_WINDOW) {
        config.window = Window::from_id(&v);
    }
    if let Some(v) = get(ENV_TAB) {
        config.tab = Tab::from_id(&v);
    }
    if let Some(v) = get(ENV_POLL_INTERVAL) {
        config.poll_interval_secs = parse_secs(ENV_POLL_INTERVAL, &v)?;
    }
    if let Some(v) = get(ENV_TIMEOUT) {
        config.request_timeout_secs = parse_secs(ENV_TIMEOUT, &v)?;
    }
    if let Some(v) = get(ENV_OUTPUT) {
        config.output_html = Some(PathBuf::from(v));
    }
    if let Some(v) = get(ENV_LOG_LEVEL) {
        config.log_level = v;
    }
    if let Some(v) = get(ENV_LOG_FILE) {
        config.log_file = Some(v);
    }
    Ok(config)
}

fn parse_secs(key: &str, value: &str) -> Result<u64, BoardError> {
    value
        .parse()
        .map_err(|_| BoardError::ConfigError(format!("{} must be whole seconds, got '{}'", key, value)))
}

/// Loads the full configuration: `.env`, then the TOML file if given, then
/// environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<BoardConfig, BoardError> {
    dotenv::dotenv().ok();

    let base = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|e| {
                BoardError::ConfigError(format!("cannot read {}: {}", p.display(), e))
            })?;
            parse_config(&text)?
        }
        None => BoardConfig::default(),
    };

    let config = apply_overrides(base, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}
