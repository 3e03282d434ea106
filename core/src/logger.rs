use crate::parser::entry::{LogEntry, LogLevel};
use std::io::Write;

/// Line logger for headless runs. Colors follow the log level when stdout is
/// a terminal.
pub struct Logger {
    use_colors: bool,
    show_timestamps: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
            show_timestamps: true,
        }
    }

    pub fn with_timestamps(mut self, show_timestamps: bool) -> Self {
        self.show_timestamps = show_timestamps;
        self
    }

    pub fn log_entry(&self, entry: &LogEntry) {
        let line = self.format_entry(entry);
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if self.use_colors {
            println!("{}{}\x1b[0m", level_color(level), message);
        } else {
            println!("{}", message);
        }
    }

    fn format_entry(&self, entry: &LogEntry) -> String {
        let timestamp = if self.show_timestamps {
            Some(entry.timestamp.format("%H:%M:%S").to_string())
        } else {
            None
        };

        match (self.use_colors, timestamp) {
            (true, Some(ts)) => format!(
                "\x1b[90m[{}]\x1b[0m {}{}\x1b[0m",
                ts,
                level_color(entry.level),
                entry.raw_line
            ),
            (true, None) => format!("{}{}\x1b[0m", level_color(entry.level), entry.raw_line),
            (false, Some(ts)) => format!("[{}] {}", ts, entry.raw_line),
            (false, None) => entry.raw_line.clone(),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "\x1b[90m",
        LogLevel::Config => "\x1b[37m",
        LogLevel::Info => "\x1b[36m",
        LogLevel::Process => "\x1b[35m",
        LogLevel::Success => "\x1b[32;1m",
        LogLevel::Warning => "\x1b[33m",
        LogLevel::Error => "\x1b[31;1m",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_format_without_timestamps() {
        let logger = Logger {
            use_colors: false,
            show_timestamps: false,
        };
        let entry = LogEntry::tagged(LogLevel::Success, "Build completed successfully!");
        assert_eq!(
            logger.format_entry(&entry),
            "[SUCCESS] Build completed successfully!"
        );
    }

    #[test]
    fn test_colored_format_resets() {
        let logger = Logger {
            use_colors: true,
            show_timestamps: false,
        };
        let entry = LogEntry::tagged(LogLevel::Error, "boom");
        let line = logger.format_entry(&entry);
        assert!(line.starts_with("\x1b[31;1m"));
        assert!(line.ends_with("\x1b[0m"));
    }
}
