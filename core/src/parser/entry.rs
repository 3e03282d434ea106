use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Config,
    Info,
    Process,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Config => "CONFIG",
            LogLevel::Info => "INFO",
            LogLevel::Process => "PROCESS",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_uppercase().as_str() {
            "DEBUG" => Some(LogLevel::Debug),
            "CONFIG" => Some(LogLevel::Config),
            "INFO" => Some(LogLevel::Info),
            "PROCESS" => Some(LogLevel::Process),
            "SUCCESS" => Some(LogLevel::Success),
            "WARNING" | "WARN" => Some(LogLevel::Warning),
            "ERROR" | "CRITICAL" | "FATAL" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Who produced a line: kiln itself (bracket-tagged status lines) or the
/// packaging tool's own output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogSource {
    Kiln,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
    pub raw_line: String,
    pub source: LogSource,
    pub index: usize,
}

impl LogEntry {
    pub fn new(
        level: LogLevel,
        message: String,
        raw_line: String,
        source: LogSource,
        index: usize,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            message,
            raw_line,
            source,
            index,
        }
    }

    /// A status line written by kiln, e.g. `[CONFIG] Clean build enabled`.
    pub fn tagged(level: LogLevel, message: impl Into<String>) -> Self {
        let message = message.into();
        let raw_line = format!("[{}] {}", level.to_str(), message);
        Self::new(level, message, raw_line, LogSource::Kiln, 0)
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_entry_formats_raw_line() {
        let entry = LogEntry::tagged(LogLevel::Config, "Clean build enabled");
        assert_eq!(entry.raw_line, "[CONFIG] Clean build enabled");
        assert_eq!(entry.message, "Clean build enabled");
        assert_eq!(entry.source, LogSource::Kiln);
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warning);
        assert!(LogLevel::Warning > LogLevel::Success);
        assert!(LogLevel::Config < LogLevel::Info);
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(LogLevel::from_tag("warning"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_tag("CRITICAL"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_tag("nope"), None);
    }
}
