//! Pipeline progress log.
//!
//! A run reports in three shapes: a top-level step (`🧹 Cleaning tables...`),
//! a table-scoped outcome or detail (`✓ [offers] 10 cleaned`), and a
//! table-scoped warning for data that was dropped or left empty. Entries are
//! rendered to stderr, keeping stdout free for CSV, and fanned out to any
//! subscriber so an embedding caller or a test can inspect what a run did.

use once_cell::sync::Lazy;
use std::fmt;
use tokio::sync::broadcast;

/// How an entry is rendered and what it means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// A pipeline stage starting.
    Step,
    /// A stage or table finished.
    Done,
    /// Supporting numbers under a `Done` line.
    Detail,
    /// Data was dropped or left empty; the run continues.
    Warning,
}

/// One log line, optionally scoped to a table or id column.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub table: Option<&'static str>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            LogLevel::Step => return f.write_str(&self.message),
            LogLevel::Done => f.write_str("   ✓ ")?,
            LogLevel::Detail => f.write_str("      ")?,
            LogLevel::Warning => f.write_str("   ⚠️  ")?,
        }
        if let Some(table) = self.table {
            write!(f, "[{}] ", table)?;
        }
        f.write_str(&self.message)
    }
}

static LOG: Lazy<broadcast::Sender<LogEntry>> = Lazy::new(|| broadcast::channel(1024).0);

fn emit(level: LogLevel, table: Option<&'static str>, message: String) {
    let entry = LogEntry { level, table, message };
    eprintln!("{}", entry);
    // Nobody subscribed
    let _ = LOG.send(entry);
}

/// Announce a pipeline stage.
pub fn step(message: impl Into<String>) {
    emit(LogLevel::Step, None, message.into());
}

/// Report an unscoped outcome, such as a file written.
pub fn done(message: impl Into<String>) {
    emit(LogLevel::Done, None, message.into());
}

/// Report an unscoped problem with the input, such as undecodable bytes.
pub fn warning(message: impl Into<String>) {
    emit(LogLevel::Warning, None, message.into());
}

/// Log handle for one table or id column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLog {
    table: &'static str,
}

impl TableLog {
    pub const fn new(table: &'static str) -> Self {
        Self { table }
    }

    pub fn done(&self, message: impl Into<String>) {
        emit(LogLevel::Done, Some(self.table), message.into());
    }

    pub fn detail(&self, message: impl Into<String>) {
        emit(LogLevel::Detail, Some(self.table), message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        emit(LogLevel::Warning, Some(self.table), message.into());
    }
}

/// Receive every entry logged from now on.
pub fn subscribe() -> broadcast::Receiver<LogEntry> {
    LOG.subscribe()
}

/// Collect everything currently buffered for `rx`, skipping over lag.
#[cfg(test)]
pub(crate) fn drain(rx: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    use broadcast::error::TryRecvError;

    let mut entries = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, table: Option<&'static str>, message: &str) -> LogEntry {
        LogEntry { level, table, message: message.to_string() }
    }

    #[test]
    fn test_rendering() {
        assert_eq!(entry(LogLevel::Step, None, "🔑 Reconciling ids...").to_string(), "🔑 Reconciling ids...");
        assert_eq!(entry(LogLevel::Done, Some("offers"), "10 cleaned").to_string(), "   ✓ [offers] 10 cleaned");
        assert_eq!(entry(LogLevel::Detail, Some("transcript"), "transaction: 4").to_string(), "      [transcript] transaction: 4");
        assert_eq!(entry(LogLevel::Warning, None, "bad bytes").to_string(), "   ⚠️  bad bytes");
    }

    #[test]
    fn test_table_log_is_scoped() {
        let mut rx = subscribe();
        let log = TableLog::new("logs-test-table");

        log.warning("3 references left empty");

        let ours: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.table == Some("logs-test-table"))
            .collect();
        assert_eq!(ours, vec![entry(LogLevel::Warning, Some("logs-test-table"), "3 references left empty")]);
    }

    #[test]
    fn test_logging_without_subscribers() {
        done("nobody listening");
    }
}
