//! Pipeline progress logging.
//!
//! Every stage reports through the process-wide [`LOGGER`]. Entries go to
//! stderr, so stdout stays free for JSON output of the `build` and
//! `normalize` commands. Two formats are available: prefixed text lines
//! (default) and JSON lines.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Output format of the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Prefixed human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Indentation level for nested steps
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Render the entry in the given format, without trailing newline.
    pub fn render(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Text => {
                let prefix = match self.level {
                    LogLevel::Info => "   ",
                    LogLevel::Success => "   ✓",
                    LogLevel::Warning => "   ⚠️",
                    LogLevel::Error => "   ❌",
                };
                let indent = "   ".repeat(self.indent as usize);
                format!("{}{} {}", indent, prefix, self.message)
            }
            LogFormat::Json => serde_json::to_string(self)
                .unwrap_or_else(|_| format!("{{\"level\":\"error\",\"message\":{:?}}}", self.message)),
        }
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Writes log entries to stderr in the configured format
pub struct Logger {
    format: AtomicU8,
}

impl Logger {
    pub fn new() -> Self {
        Self { format: AtomicU8::new(0) }
    }

    pub fn set_format(&self, format: LogFormat) {
        let raw = match format {
            LogFormat::Text => 0,
            LogFormat::Json => 1,
        };
        self.format.store(raw, Ordering::Relaxed);
    }

    pub fn format(&self) -> LogFormat {
        match self.format.load(Ordering::Relaxed) {
            1 => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    pub fn log(&self, entry: LogEntry) {
        let line = entry.render(self.format());
        // A closed stderr is not worth failing the run for
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::info(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_render() {
        let line = LogEntry::success("Read 2 rows").render(LogFormat::Text);
        assert_eq!(line, "   ✓ Read 2 rows");

        let nested = LogEntry::info("DimDate: 2").with_indent(1).render(LogFormat::Text);
        assert!(nested.starts_with("      "));
        assert!(nested.ends_with("DimDate: 2"));
    }

    #[test]
    fn test_json_render() {
        let line = LogEntry::warning("1 row dropped").render(LogFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "warning");
        assert_eq!(value["message"], "1 row dropped");
        assert_eq!(value["indent"], 0);
    }

    #[test]
    fn test_logger_format_switch() {
        let logger = Logger::new();
        assert_eq!(logger.format(), LogFormat::Text);
        logger.set_format(LogFormat::Json);
        assert_eq!(logger.format(), LogFormat::Json);
    }
}
