use super::entry::{LogEntry, LogLevel, LogSource};
use regex::Regex;

pub trait LogFilter: Send + Sync {
    fn matches(&self, entry: &LogEntry) -> bool;
    fn description(&self) -> String;
}

pub struct LevelFilter {
    min_level: LogLevel,
}

impl LevelFilter {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl LogFilter for LevelFilter {
    fn matches(&self, entry: &LogEntry) -> bool {
        entry.level >= self.min_level
    }

    fn description(&self) -> String {
        format!("level >= {}", self.min_level.to_str())
    }
}

pub struct PatternFilter {
    pattern: Regex,
    case_sensitive: bool,
}

impl PatternFilter {
    pub fn new(pattern: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let pattern = if case_sensitive {
            Regex::new(pattern)?
        } else {
            Regex::new(&format!("(?i){}", pattern))?
        };
        Ok(Self {
            pattern,
            case_sensitive,
        })
    }
}

impl LogFilter for PatternFilter {
    fn matches(&self, entry: &LogEntry) -> bool {
        self.pattern.is_match(&entry.message) || self.pattern.is_match(&entry.raw_line)
    }

    fn description(&self) -> String {
        format!(
            "pattern: {} ({})",
            self.pattern.as_str(),
            if self.case_sensitive {
                "case-sensitive"
            } else {
                "case-insensitive"
            }
        )
    }
}

pub struct SourceFilter {
    source: LogSource,
}

impl SourceFilter {
    pub fn new(source: LogSource) -> Self {
        Self { source }
    }
}

impl LogFilter for SourceFilter {
    fn matches(&self, entry: &LogEntry) -> bool {
        entry.source == self.source
    }

    fn description(&self) -> String {
        match self.source {
            LogSource::Kiln => "source: kiln".to_string(),
            LogSource::Tool => "source: tool".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool_line(level: LogLevel, text: &str) -> LogEntry {
        LogEntry::new(level, text.to_string(), text.to_string(), LogSource::Tool, 0)
    }

    #[test]
    fn test_level_filter() {
        let filter = LevelFilter::new(LogLevel::Warning);
        assert!(filter.matches(&tool_line(LogLevel::Error, "boom")));
        assert!(!filter.matches(&tool_line(LogLevel::Info, "fine")));
        assert_eq!(filter.description(), "level >= WARNING");
    }

    #[test]
    fn test_pattern_filter_case_insensitive() {
        let filter = PatternFilter::new("hidden import", false).unwrap();
        assert!(filter.matches(&tool_line(LogLevel::Warning, "Hidden import 'x' not found")));
        assert!(!filter.matches(&tool_line(LogLevel::Info, "Building EXE")));
    }

    #[test]
    fn test_source_filter() {
        let filter = SourceFilter::new(LogSource::Kiln);
        assert!(filter.matches(&LogEntry::tagged(LogLevel::Config, "Console mode enabled")));
        assert!(!filter.matches(&tool_line(LogLevel::Info, "x")));
    }
}
