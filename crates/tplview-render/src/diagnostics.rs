//! Diagnostics sink for render and watch lifecycle messages.
//!
//! Every line goes to two places: the live console and an append-only
//! in-memory log. The log covers the whole lifetime of the sink, not just the
//! last render, and is never truncated.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use console::{Style, Term};

/// Severity of a diagnostic line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => f.write_str("info"),
            Level::Warning => f.write_str("warning"),
            Level::Error => f.write_str("error"),
        }
    }
}

/// Destination for human-readable diagnostics.
///
/// Implementations must be safe to share between the caller's thread and the
/// watch thread.
pub trait DiagnosticsSink: Send + Sync {
    /// Records one line.
    fn append(&self, level: Level, line: &str);

    /// Everything recorded so far, one line per entry.
    fn contents(&self) -> String;

    fn info(&self, line: &str) {
        self.append(Level::Info, line);
    }

    fn warning(&self, line: &str) {
        self.append(Level::Warning, line);
    }

    fn error(&self, line: &str) {
        self.append(Level::Error, line);
    }

    /// Records a warning followed by an indented line with the cause.
    fn warning_with_cause(&self, line: &str, cause: &dyn fmt::Display) {
        self.append(Level::Warning, line);
        self.append(Level::Warning, &format!("    Info: {}", cause));
    }

    /// Records an error followed by an indented line with the cause.
    fn error_with_cause(&self, line: &str, cause: &dyn fmt::Display) {
        self.append(Level::Error, line);
        self.append(Level::Error, &format!("    Info: {}", cause));
    }
}

/// Console-backed sink with an in-memory copy.
///
/// Warnings print in yellow and errors in red when the terminal supports
/// colour; the in-memory copy is always plain text.
pub struct ConsoleLog {
    term: Term,
    buffer: Mutex<String>,
}

impl ConsoleLog {
    /// Logs to standard output.
    pub fn new() -> Self {
        Self::with_term(Term::stdout())
    }

    /// Logs to the given terminal.
    pub fn with_term(term: Term) -> Self {
        Self {
            term,
            buffer: Mutex::new(String::new()),
        }
    }

    fn style(level: Level) -> Style {
        match level {
            Level::Info => Style::new(),
            Level::Warning => Style::new().yellow(),
            Level::Error => Style::new().red(),
        }
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticsSink for ConsoleLog {
    fn append(&self, level: Level, line: &str) {
        let styled = Self::style(level).apply_to(line);
        // A closed console must not stop the render loop.
        let _ = self.term.write_line(&styled.to_string());

        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.push_str(line);
        buffer.push('\n');
    }

    fn contents(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Capture-only sink for tests.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines with their levels.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any line at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(l, line)| *l == level && line.contains(needle))
    }
}

impl DiagnosticsSink for MemoryLog {
    fn append(&self, level: Level, line: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, line.to_string()));
    }

    fn contents(&self) -> String {
        self.entries()
            .into_iter()
            .map(|(_, line)| line + "\n")
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_accumulates() {
        let log = MemoryLog::new();
        log.info("first");
        log.warning("second");
        log.info("");
        assert_eq!(log.contents(), "first\nsecond\n\n");
        assert!(log.contains(Level::Warning, "sec"));
        assert!(!log.contains(Level::Error, "sec"));
    }

    #[test]
    fn test_warning_with_cause_adds_info_line() {
        let log = MemoryLog::new();
        log.warning_with_cause("Unable to read file: a.json", &"locked");
        assert_eq!(
            log.entries(),
            vec![
                (Level::Warning, "Unable to read file: a.json".to_string()),
                (Level::Warning, "    Info: locked".to_string()),
            ]
        );
    }

    #[test]
    fn test_error_with_cause_keeps_error_level() {
        let log = MemoryLog::new();
        log.error_with_cause("Unable to write output file: out.txt", &"disk full");
        assert!(log.contains(Level::Error, "    Info: disk full"));
        assert!(!log.contains(Level::Warning, "disk full"));
    }

    #[test]
    fn test_console_log_keeps_plain_copy() {
        let log = ConsoleLog::with_term(Term::stderr());
        log.error("boom");
        log.info("after");
        assert_eq!(log.contents(), "boom\nafter\n");
    }
}
