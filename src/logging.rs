/// Structured logging for the wind board
///
/// Provides context-rich logging with a component tag, an optional
/// station/request context, timestamps, and severity levels. Supports both
/// console output and an append-only log file for long-running boards.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::BoardError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(BoardError::ConfigError(format!("unknown log level '{}'", other))),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Fetch,
    Render,
    Config,
    Session,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Fetch => write!(f, "FETCH"),
            Component::Render => write!(f, "RENDER"),
            Component::Config => write!(f, "CONFIG"),
            Component::Session => write!(f, "SESSION"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

/// How alarming a failed refresh is, which decides the level it is logged at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Gateway errors seen while the backend scheduler restarts; the next
    /// poll normally succeeds.
    Expected,
    /// The backend answered with an error status or a body that is not a
    /// board payload.
    Unexpected,
    /// Transport trouble (refused, reset, timed out) whose cause the client
    /// cannot see.
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FailureType::Expected => "EXPECTED",
            FailureType::Unexpected => "UNEXPECTED",
            FailureType::Unknown => "UNKNOWN",
        };
        f.write_str(tag)
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Process-wide sink, installed once by `init_logger`. Entries logged before
/// that are dropped.
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Entries below this level are discarded.
    threshold: LogLevel,
    /// Append-only file receiving every accepted entry in full form.
    file_sink: Option<String>,
    /// Print full timestamped entries on stderr instead of the short form.
    verbose_console: bool,
}

impl Logger {
    pub fn init(threshold: LogLevel, file_sink: Option<String>, verbose_console: bool) {
        let logger = Logger {
            threshold,
            file_sink,
            verbose_console,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: Component, context: Option<&str>, message: &str) {
        if level < self.threshold {
            return;
        }

        let entry = format_entry(
            &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            level,
            component,
            context,
            message,
        );

        // stdout carries the board; diagnostics stay on stderr.
        let console = if self.verbose_console {
            Some(entry.clone())
        } else {
            short_console_line(level, component, context, message)
        };
        if let Some(line) = console {
            eprintln!("{}", line);
        }

        if let Some(ref path) = self.file_sink {
            if let Err(e) = Self::append_to_file(path, &entry) {
                eprintln!("cannot append to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Compact console form. Debug entries only reach the file sink.
fn short_console_line(
    level: LogLevel,
    component: Component,
    context: Option<&str>,
    message: &str,
) -> Option<String> {
    let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
    match level {
        LogLevel::Error => Some(format!("   ✗ {}{}: {}", component, context_part, message)),
        LogLevel::Warning => Some(format!("   ⚠ {}{}: {}", component, context_part, message)),
        LogLevel::Info => Some(format!("   {}: {}", component, message)),
        LogLevel::Debug => None,
    }
}

fn format_entry(
    timestamp: &str,
    level: LogLevel,
    component: Component,
    context: Option<&str>,
    message: &str,
) -> String {
    let context_part = context.map(|c| format!(" [{}]", c)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, context_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Installs the process-wide logger.
pub fn init_logger(threshold: LogLevel, log_file: Option<&str>, verbose_console: bool) {
    Logger::init(threshold, log_file.map(String::from), verbose_console);
}

fn dispatch(level: LogLevel, component: Component, context: Option<&str>, message: &str) {
    // A poisoned lock means another thread panicked mid-log; drop the entry.
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, component, context, message);
        }
    }
}

pub fn info(component: Component, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, context, message);
}

/// Something degraded but the board keeps running.
pub fn warn(component: Component, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, context, message);
}

pub fn error(component: Component, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, context, message);
}

pub fn debug(component: Component, context: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, context, message);
}

// ---------------------------------------------------------------------------
// Fetch Failure Logging
// ---------------------------------------------------------------------------

/// Classify a data endpoint failure.
///
/// 502/503/504 are what the backend's reverse proxy returns while the
/// scheduler restarts it, so they are expected. Other HTTP statuses and
/// undecodable bodies point at a backend fault.
pub fn classify_fetch_failure(err: &BoardError) -> FailureType {
    match err {
        BoardError::HttpError(502..=504) => FailureType::Expected,
        BoardError::HttpError(_) | BoardError::ParseError(_) => FailureType::Unexpected,
        _ => FailureType::Unknown,
    }
}

/// Logs a failed refresh at the level its classification calls for.
pub fn log_fetch_failure(request: &str, err: &BoardError) {
    let failure_type = classify_fetch_failure(err);
    let message = format!("refresh failed [{}]: {}", failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Fetch, Some(request), &message),
        FailureType::Unexpected => error(Component::Fetch, Some(request), &message),
        FailureType::Unknown => warn(Component::Fetch, Some(request), &message),
    }
}
