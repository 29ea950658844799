//! Bridge logging
//!
//! The bridge never logs through process-wide state. A `BridgeLogger` is
//! injected when the client is built and shared with every request it starts.
//! `NullLogger` is the default; `TracingLogger` forwards to `tracing`.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Logger trait for customizable logging backends
///
/// Implementations must tolerate being called from native callback threads.
pub trait BridgeLogger: Send + Sync {
    /// Log a message
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Null logger (no-op, the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl BridgeLogger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// In-memory logger, mainly for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Captured entries at the given level
    pub fn entries_at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }
}

impl BridgeLogger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

/// Logger forwarding to the `tracing` ecosystem under the `bridge` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl BridgeLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "bridge", "{}", message),
            LogLevel::Error => tracing::error!(target: "bridge", "{}", message),
        }
    }
}
