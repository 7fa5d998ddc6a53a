// Capturing Logger
//
// Logger that records lines in memory instead of printing them.

use std::sync::{Arc, Mutex};

use super::logger::{LogLevel, Logger};

/// Records every enabled log line, in order.
///
/// Cloning shares the underlying buffer.
#[derive(Clone)]
pub struct CapturingLogger {
    level: LogLevel,
    pub lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl CapturingLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Messages logged at exactly `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(LogLevel, String)>> {
        // A poisoned buffer still holds valid lines.
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, level: LogLevel, msg: &str) {
        if self.is_enabled(level) {
            self.lock().push((level, msg.to_string()));
        }
    }
}

impl Default for CapturingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Debug)
    }
}

impl Logger for CapturingLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn debug(&self, msg: &str) {
        self.record(LogLevel::Debug, msg);
    }

    fn info(&self, msg: &str) {
        self.record(LogLevel::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.record(LogLevel::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.record(LogLevel::Error, msg);
    }
}
