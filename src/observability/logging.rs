//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the process
//! - Define the leveled `LogSink` capability the worker writes through
//! - Provide a tracing-backed sink and an in-memory sink
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for service mode, human-readable format for interactive mode
//! - `RUST_LOG` takes precedence over the configured level
//! - Sinks filter by a minimum level of their own, independent of the subscriber

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Severity of a sink record, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// A sink refused a record.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Anything that accepts leveled messages.
///
/// Implementations must tolerate concurrent writers.
pub trait LogSink: Send + Sync {
    fn write(&self, level: Level, message: &str) -> Result<(), SinkError>;
}

/// Forwards records to the global tracing subscriber.
#[derive(Debug, Clone)]
pub struct TracingSink {
    min_level: Level,
}

impl TracingSink {
    pub fn new(min_level: Level) -> Self {
        Self { min_level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(Level::Debug)
    }
}

impl LogSink for TracingSink {
    fn write(&self, level: Level, message: &str) -> Result<(), SinkError> {
        if level < self.min_level {
            return Ok(());
        }
        match level {
            Level::Debug => tracing::debug!(target: "beep_service::worker", "{}", message),
            Level::Info => tracing::info!(target: "beep_service::worker", "{}", message),
            Level::Warn => tracing::warn!(target: "beep_service::worker", "{}", message),
            Level::Error => tracing::error!(target: "beep_service::worker", "{}", message),
            Level::Fatal => {
                tracing::error!(target: "beep_service::worker", fatal = true, "{}", message)
            }
        }
        Ok(())
    }
}

/// One record captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

/// Keeps records in memory. Can be switched into a failing mode.
#[derive(Debug)]
pub struct MemorySink {
    min_level: Level,
    entries: Mutex<Vec<LogEntry>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_min_level(Level::Debug)
    }

    pub fn with_min_level(min_level: Level) -> Self {
        Self {
            min_level,
            entries: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// When set, every write is rejected and nothing is recorded.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of all recorded entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Number of entries at `level` whose message contains `needle`.
    pub fn count(&self, level: Level, needle: &str) -> usize {
        self.lock()
            .iter()
            .filter(|entry| entry.level == level && entry.message.contains(needle))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for MemorySink {
    fn write(&self, level: Level, message: &str) -> Result<(), SinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError("memory sink is failing".to_string()));
        }
        if level < self.min_level {
            return Ok(());
        }
        self.lock().push(LogEntry {
            level,
            message: message.to_string(),
        });
        Ok(())
    }
}

/// Output format of the process-wide subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON in service mode, pretty otherwise.
    #[default]
    Auto,
    Json,
    Pretty,
}

/// Install the global tracing subscriber.
///
/// Records go to stdout. Nothing else in the process writes there.
///
/// Fails if the filter directive is invalid or a subscriber is already set.
pub fn init_logging(format: LogFormat, default_level: &str) -> Result<(), String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).map_err(|e| e.to_string())?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stdout))
            .try_init(),
        LogFormat::Pretty | LogFormat::Auto => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stdout))
            .try_init(),
    };
    result.map_err(|e| e.to_string())
}
