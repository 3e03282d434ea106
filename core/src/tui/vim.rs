use crate::parser::entry::{LogLevel, LogSource};
use crate::parser::filters::{LevelFilter, LogFilter, PatternFilter, SourceFilter};
use crate::theme::ThemeName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Command,
    Search,
}

#[derive(Debug)]
pub struct VimCommandMode {
    pub mode: InputMode,
    pub input_buffer: String,
    pub search_pattern: Option<String>,
}

pub enum CommandResult {
    Quit,
    Build,
    WriteLogs(Option<String>),
    ApplyFilter(Box<dyn LogFilter>),
    ClearFilter,
    ClearLog,
    SetTheme(ThemeName),
    GotoLine(usize),
    Unknown(String),
}

impl VimCommandMode {
    pub fn new() -> Self {
        Self {
            mode: InputMode::Normal,
            input_buffer: String::new(),
            search_pattern: None,
        }
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = InputMode::Command;
        self.input_buffer.clear();
    }

    pub fn enter_search_mode(&mut self) {
        self.mode = InputMode::Search;
        self.input_buffer.clear();
    }

    pub fn enter_edit_mode(&mut self) {
        self.mode = InputMode::Editing;
        self.input_buffer.clear();
    }

    pub fn exit_to_normal(&mut self) {
        self.mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    pub fn push_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input_buffer.pop();
    }

    pub fn execute_command(&mut self) -> Option<CommandResult> {
        let result = parse_command_line(self.input_buffer.trim());
        self.exit_to_normal();
        result
    }

    pub fn execute_search(&mut self) -> Option<String> {
        let pattern = self.input_buffer.trim().to_string();
        self.exit_to_normal();

        if pattern.is_empty() {
            self.search_pattern = None;
        } else {
            self.search_pattern = Some(pattern);
        }
        self.search_pattern.clone()
    }
}

impl Default for VimCommandMode {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_command_line(cmd: &str) -> Option<CommandResult> {
    if cmd.is_empty() {
        return None;
    }

    let result = if cmd == "q" || cmd == "quit" {
        CommandResult::Quit
    } else if cmd == "b" || cmd == "build" {
        CommandResult::Build
    } else if cmd == "w" || cmd.starts_with("w ") {
        let file = cmd
            .strip_prefix("w ")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        CommandResult::WriteLogs(file)
    } else if cmd == "clear" {
        CommandResult::ClearLog
    } else if cmd == "nofilter" || cmd == "nf" {
        CommandResult::ClearFilter
    } else if let Some(level) = cmd.strip_prefix("filter level=") {
        let level = LogLevel::from_tag(level.trim())?;
        CommandResult::ApplyFilter(Box::new(LevelFilter::new(level)))
    } else if let Some(source) = cmd.strip_prefix("filter source=") {
        let source = match source.trim() {
            "kiln" => LogSource::Kiln,
            "tool" | "pyinstaller" => LogSource::Tool,
            _ => return None,
        };
        CommandResult::ApplyFilter(Box::new(SourceFilter::new(source)))
    } else if let Some(pattern) = cmd.strip_prefix("filter ") {
        let filter = PatternFilter::new(pattern.trim(), false).ok()?;
        CommandResult::ApplyFilter(Box::new(filter))
    } else if let Some(theme) = cmd.strip_prefix("theme ") {
        CommandResult::SetTheme(ThemeName::parse(theme)?)
    } else if let Ok(line_number) = cmd.parse::<usize>() {
        CommandResult::GotoLine(line_number)
    } else {
        CommandResult::Unknown(cmd.to_string())
    };

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(cmd: &str) -> Option<CommandResult> {
        let mut vim = VimCommandMode::new();
        vim.enter_command_mode();
        for c in cmd.chars() {
            vim.push_char(c);
        }
        let result = vim.execute_command();
        assert_eq!(vim.mode, InputMode::Normal);
        result
    }

    #[test]
    fn test_write_with_and_without_file() {
        assert!(matches!(run("w"), Some(CommandResult::WriteLogs(None))));
        match run("w build.json") {
            Some(CommandResult::WriteLogs(Some(file))) => assert_eq!(file, "build.json"),
            _ => panic!("expected WriteLogs"),
        }
    }

    #[test]
    fn test_filters() {
        match run("filter level=warning") {
            Some(CommandResult::ApplyFilter(filter)) => {
                assert_eq!(filter.description(), "level >= WARNING")
            }
            _ => panic!("expected level filter"),
        }
        assert!(run("filter level=loud").is_none());
        assert!(matches!(run("nf"), Some(CommandResult::ClearFilter)));
        assert!(matches!(
            run("filter source=tool"),
            Some(CommandResult::ApplyFilter(_))
        ));
    }

    #[test]
    fn test_theme_and_goto() {
        assert!(matches!(
            run("theme dark"),
            Some(CommandResult::SetTheme(ThemeName::Dark))
        ));
        assert!(matches!(run("42"), Some(CommandResult::GotoLine(42))));
        assert!(matches!(run("frobnicate"), Some(CommandResult::Unknown(_))));
        assert!(run("").is_none());
    }

    #[test]
    fn test_search_pattern_is_remembered() {
        let mut vim = VimCommandMode::new();
        vim.enter_search_mode();
        vim.push_char('x');
        vim.pop_char();
        vim.push_char('W');
        assert_eq!(vim.execute_search(), Some("W".to_string()));
        assert_eq!(vim.search_pattern.as_deref(), Some("W"));
    }
}
