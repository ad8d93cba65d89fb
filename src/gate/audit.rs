//! Audit trail for gate outcomes.
//!
//! Every failure outcome writes exactly one warning-level line. Trace
//! messages about target selection go out at debug level.

use parking_lot::Mutex;
use serde::Serialize;

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Warn,
}

/// One audit line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub level: Level,
    pub message: String,
}

impl AuditEntry {
    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warn,
            message: message.into(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self {
            level: Level::Debug,
            message: message.into(),
        }
    }
}

/// Destination for audit entries.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

/// Writes entries through the terminal logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudit;

impl AuditSink for LogAudit {
    fn record(&self, entry: AuditEntry) {
        match entry.level {
            Level::Warn => crate::log!("warning"; "{}", entry.message),
            Level::Debug => crate::debug!("gate"; "{}", entry.message),
        }
    }
}

/// Keeps entries in memory, used by `check` and in tests.
#[derive(Debug, Default)]
pub struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    /// Only the warning-level messages.
    pub fn warnings(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == Level::Warn)
            .map(|e| e.message.clone())
            .collect()
    }

    /// Drain all entries.
    pub fn take(&self) -> Vec<AuditEntry> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, entry: AuditEntry) {
        self.entries.lock().push(entry);
    }
}
