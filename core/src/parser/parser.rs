use super::entry::{LogEntry, LogLevel, LogSource};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static KILN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(ERROR|SUCCESS|WARNING|INFO|PROCESS|CONFIG)\]").unwrap()
});
static TOOL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d+\s+)?(DEBUG|INFO|WARNING|WARN|ERROR|CRITICAL):\s*(.*)$").unwrap());
static PYTHON_TRACEBACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Traceback \(most recent call last\):").unwrap());
static PYTHON_EXCEPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z_][\w.]*\.)?[A-Z]\w*(?:Error|Exception):").unwrap());
static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Classifies raw output lines into log entries. Bracket tags written by kiln
/// take precedence over the packaging tool's own `1234 INFO: ...` prefixes.
#[derive(Clone)]
pub struct OutputParser {
    log_index: usize,
}

impl OutputParser {
    pub fn new() -> Self {
        Self { log_index: 0 }
    }

    /// Parses a line whose origin is unknown: a leading bracket tag marks it
    /// as kiln's own, anything else is attributed to the packaging tool.
    pub fn parse_line(&mut self, line: &str) -> LogEntry {
        let source = if leading_tag(&strip_ansi(line)).is_some() {
            LogSource::Kiln
        } else {
            LogSource::Tool
        };
        self.parse_line_from(line, source)
    }

    /// Parses a line from a known source. A bracket tag still sets the level,
    /// but never changes who the line is attributed to.
    pub fn parse_line_from(&mut self, line: &str, source: LogSource) -> LogEntry {
        let stripped = strip_ansi(line);
        let index = self.log_index;
        self.log_index += 1;

        if let Some((level, tag_len)) = leading_tag(&stripped) {
            let message = stripped[tag_len..].trim_start().to_string();
            return LogEntry::new(level, message, line.to_string(), source, index);
        }

        if let Some(caps) = TOOL_PREFIX.captures(&stripped) {
            let level = LogLevel::from_tag(&caps[1]).unwrap_or(LogLevel::Info);
            return LogEntry::new(level, caps[2].to_string(), line.to_string(), source, index);
        }

        if PYTHON_TRACEBACK.is_match(&stripped) || PYTHON_EXCEPTION.is_match(&stripped) {
            return LogEntry::new(
                LogLevel::Error,
                stripped.clone(),
                line.to_string(),
                source,
                index,
            );
        }

        LogEntry::new(LogLevel::Info, stripped, line.to_string(), source, index)
    }

    /// Re-numbers an entry produced elsewhere (e.g. by the command builder) so
    /// the console sees one monotonic sequence.
    pub fn stamp(&mut self, entry: LogEntry) -> LogEntry {
        let index = self.log_index;
        self.log_index += 1;
        entry.with_index(index)
    }

    pub fn reset(&mut self) {
        self.log_index = 0;
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte ranges of every bracket keyword (`[ERROR]`, `[CONFIG]`, ...) in a line,
/// for bold highlighting.
pub fn keyword_spans(line: &str) -> Vec<(Range<usize>, LogLevel)> {
    KILN_TAG
        .captures_iter(line)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let level = LogLevel::from_tag(caps.get(1)?.as_str())?;
            Some((whole.range(), level))
        })
        .collect()
}

pub fn strip_ansi(s: &str) -> String {
    ANSI_ESCAPE.replace_all(s, "").to_string()
}

fn leading_tag(line: &str) -> Option<(LogLevel, usize)> {
    let caps = KILN_TAG.captures(line)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 {
        return None;
    }
    let level = LogLevel::from_tag(&caps[1]).unwrap_or(LogLevel::Info);
    Some((level, whole.end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kiln_tag_parsing() {
        let mut parser = OutputParser::new();
        let entry = parser.parse_line("[WARNING] Icon file not found at: app.ico");

        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.source, LogSource::Kiln);
        assert_eq!(entry.message, "Icon file not found at: app.ico");
    }

    #[test]
    fn test_tagged_tool_line_keeps_tool_source() {
        let mut parser = OutputParser::new();
        let entry = parser.parse_line_from("[INFO] building wheel", LogSource::Tool);

        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.source, LogSource::Tool);
        assert_eq!(entry.message, "building wheel");

        let entry = parser.parse_line_from("[ERROR] hook failed", LogSource::Tool);
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.source, LogSource::Tool);

        let entry = parser.parse_line_from("plain output", LogSource::Kiln);
        assert_eq!(entry.source, LogSource::Kiln);
    }

    #[test]
    fn test_tool_prefix_parsing() {
        let mut parser = OutputParser::new();

        let entry = parser.parse_line("1234 INFO: PyInstaller: 6.3.0");
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.source, LogSource::Tool);
        assert_eq!(entry.message, "PyInstaller: 6.3.0");

        let entry = parser.parse_line("5678 WARNING: Hidden import \"foo\" not found!");
        assert_eq!(entry.level, LogLevel::Warning);

        let entry = parser.parse_line("ERROR: Script file 'x.py' does not exist.");
        assert_eq!(entry.level, LogLevel::Error);
    }

    #[test]
    fn test_python_errors() {
        let mut parser = OutputParser::new();
        assert_eq!(
            parser.parse_line("Traceback (most recent call last):").level,
            LogLevel::Error
        );
        assert_eq!(
            parser.parse_line("ModuleNotFoundError: No module named 'foo'").level,
            LogLevel::Error
        );
        assert_eq!(
            parser.parse_line("  File \"main.py\", line 3").level,
            LogLevel::Info
        );
    }

    #[test]
    fn test_indices_are_monotonic() {
        let mut parser = OutputParser::new();
        let first = parser.parse_line("a");
        let second = parser.stamp(LogEntry::tagged(LogLevel::Info, "b"));
        let third = parser.parse_line("c");
        assert_eq!((first.index, second.index, third.index), (0, 1, 2));

        parser.reset();
        assert_eq!(parser.parse_line("d").index, 0);
    }

    #[test]
    fn test_keyword_spans() {
        let line = "[ERROR] failed, see [INFO] above";
        let spans = keyword_spans(line);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0], (0..7, LogLevel::Error));
        assert_eq!(&line[spans[1].0.clone()], "[INFO]");
    }

    #[test]
    fn test_ansi_stripping() {
        let ansi_str = "\x1b[31mERROR:\x1b[0m Something went wrong";
        assert_eq!(strip_ansi(ansi_str), "ERROR: Something went wrong");
    }
}
