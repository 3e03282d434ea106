use super::form::{FieldId, FieldKind, FormState};
use super::input::{handle_key_event, InputAction};
use super::tabs::console::ConsoleTab;
use super::tabs::form::FormTab;
use super::tabs::TabId;
use super::vim::{CommandResult, InputMode, VimCommandMode};
use crate::clipboard::copy_to_clipboard;
use crate::command::CommandBuilder;
use crate::config::Config;
use crate::executor::BuildOutcome;
use crate::options::BuildOptions;
use crate::parser::entry::LogEntry;
use crate::parser::filters::LogFilter;
use crate::report::{write_log_text, BuildReport};
use crate::runner::{BuildError, BuildEvent, BuildState, BuildWorker};
use crate::theme::{Palette, ThemeName};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, BorderType, Borders, Clear, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    ConfirmQuit,
    Error { title: String, message: String },
}

pub struct App {
    config: Config,
    theme: ThemeName,
    current_tab: TabId,
    selected_field: usize,
    form: FormState,
    vim_mode: VimCommandMode,
    log_entries: Vec<LogEntry>,
    active_filter: Option<Box<dyn LogFilter>>,
    console_scroll_state: ListState,
    auto_scroll: bool,
    console_viewport_height: u16,
    worker: BuildWorker,
    events: mpsc::UnboundedReceiver<BuildEvent>,
    last_outcome: Option<BuildOutcome>,
    dialog: Option<Dialog>,
    status_message: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, options: &BuildOptions) -> Self {
        let (worker, events) = BuildWorker::new(CommandBuilder::new(config.tool.program.clone()));

        Self {
            theme: config.display.theme,
            config,
            current_tab: TabId::Basic,
            selected_field: 0,
            form: FormState::from_options(options),
            vim_mode: VimCommandMode::new(),
            log_entries: Vec::new(),
            active_filter: None,
            console_scroll_state: ListState::default(),
            auto_scroll: true,
            console_viewport_height: 20,
            worker,
            events,
            last_outcome: None,
            dialog: None,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn last_outcome(&self) -> Option<&BuildOutcome> {
        self.last_outcome.as_ref()
    }

    /// Snapshot of the most recent build for `--report` and `:w *.json`.
    pub fn report(&self) -> BuildReport {
        let command = self
            .worker
            .last_command()
            .map(|c| c.args.clone())
            .unwrap_or_default();
        BuildReport::new(command, self.last_outcome.clone(), self.log_entries.clone())
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        terminal.clear()?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let render_throttle = Duration::from_millis(50);
        terminal.draw(|f| self.render(f))?;
        let mut last_render = Instant::now();

        while !self.should_quit {
            self.process_build_events();

            if last_render.elapsed() >= render_throttle {
                terminal.draw(|f| self.render(f))?;
                last_render = Instant::now();
            }

            if event::poll(Duration::from_millis(20))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                        terminal.draw(|f| self.render(f))?;
                        last_render = Instant::now();
                    }
                }
            }

            // Gives the build task a chance to run on a single-threaded runtime.
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn process_build_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                BuildEvent::Log(entry) => self.push_log(entry),
                BuildEvent::Finished(outcome) => self.finish_build(outcome),
            }
        }
    }

    fn push_log(&mut self, entry: LogEntry) {
        let max_log_lines = self.config.display.max_log_lines.max(1);
        if self.log_entries.len() >= max_log_lines {
            let overflow = self.log_entries.len() + 1 - max_log_lines;
            self.log_entries.drain(..overflow);
        }
        self.log_entries.push(entry);
    }

    fn finish_build(&mut self, outcome: BuildOutcome) {
        if outcome.success {
            self.status_message = Some(format!("{} ({:.1}s)", outcome.message, outcome.duration));
        } else {
            self.status_message = Some(outcome.message.clone());
            self.dialog = Some(Dialog::Error {
                title: "Build Failed".to_string(),
                message: outcome.message.clone(),
            });
        }
        self.last_outcome = Some(outcome);
    }

    fn current_field(&self) -> FieldId {
        let fields = self.current_tab.fields();
        fields[self.selected_field.min(fields.len() - 1)]
    }

    fn palette(&self) -> &'static Palette {
        self.theme.palette()
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = self.dialog.take() {
            if dialog == Dialog::ConfirmQuit
                && matches!(
                    key.code,
                    event::KeyCode::Char('y') | event::KeyCode::Char('Y') | event::KeyCode::Enter
                )
            {
                self.should_quit = true;
            }
            return;
        }

        let field = self.current_field();
        let multiline = field.kind() == FieldKind::MultiLine;
        let action = handle_key_event(key, self.vim_mode.mode, multiline);

        match action {
            InputAction::Quit => self.request_quit(),
            InputAction::SwitchTab(index) => {
                if let Some(tab) = TabId::from_index(index) {
                    self.select_tab(tab);
                }
            }
            InputAction::NextTab => self.select_tab(self.current_tab.next()),
            InputAction::PrevTab => self.select_tab(self.current_tab.prev()),
            InputAction::NextField => {
                let count = self.current_tab.fields().len();
                self.selected_field = (self.selected_field + 1) % count;
            }
            InputAction::PrevField => {
                let count = self.current_tab.fields().len();
                self.selected_field = (self.selected_field + count - 1) % count;
            }
            InputAction::Activate => match field.kind() {
                FieldKind::Toggle => self.form.toggle(field),
                FieldKind::Text | FieldKind::MultiLine => self.vim_mode.enter_edit_mode(),
            },
            InputAction::StartBuild => self.start_build(),
            InputAction::ToggleTheme => self.theme = self.theme.toggle(),
            InputAction::ClearLog => self.clear_log(),
            InputAction::YankLine => self.yank_current_line(),
            InputAction::EnterCommand => self.vim_mode.enter_command_mode(),
            InputAction::EnterSearch => self.vim_mode.enter_search_mode(),
            InputAction::ExecuteCommand => {
                if let Some(result) = self.vim_mode.execute_command() {
                    self.handle_command_result(result);
                }
            }
            InputAction::ExecuteSearch => {
                if self.vim_mode.execute_search().is_some() {
                    self.jump_to_search_match(true);
                }
            }
            InputAction::CancelInput => self.vim_mode.exit_to_normal(),
            InputAction::InsertChar(c) => match self.vim_mode.mode {
                InputMode::Editing => self.form.insert_char(field, c),
                _ => self.vim_mode.push_char(c),
            },
            InputAction::Backspace => match self.vim_mode.mode {
                InputMode::Editing => self.form.backspace(field),
                _ => self.vim_mode.pop_char(),
            },
            InputAction::ClearField => self.form.clear(field),
            InputAction::NextSearch => self.jump_to_search_match(true),
            InputAction::PrevSearch => self.jump_to_search_match(false),
            InputAction::ScrollUp => self.scroll_console_up(1),
            InputAction::ScrollDown => self.scroll_console_down(1),
            InputAction::ScrollPageUp => self.scroll_console_up(self.page_size()),
            InputAction::ScrollPageDown => self.scroll_console_down(self.page_size()),
            InputAction::ScrollHalfPageUp => self.scroll_console_up(self.half_page()),
            InputAction::ScrollHalfPageDown => self.scroll_console_down(self.half_page()),
            InputAction::ScrollToTop => {
                self.auto_scroll = false;
                self.console_scroll_state.select(Some(0));
            }
            InputAction::ScrollToBottom => self.scroll_console_to_bottom(),
            InputAction::None => {}
        }
    }

    fn select_tab(&mut self, tab: TabId) {
        if tab != self.current_tab {
            self.current_tab = tab;
            self.selected_field = 0;
        }
    }

    fn request_quit(&mut self) {
        if self.worker.is_running() {
            self.dialog = Some(Dialog::ConfirmQuit);
        } else {
            self.should_quit = true;
        }
    }

    fn start_build(&mut self) {
        if self.worker.is_running() {
            self.status_message = Some(BuildError::Busy.to_string());
            return;
        }

        // Anything still queued from the previous build belongs to the old log.
        self.process_build_events();

        match self.worker.start(self.form.to_options()) {
            Ok(()) => {
                self.log_entries.clear();
                self.console_scroll_state.select(None);
                self.auto_scroll = true;
                self.last_outcome = None;
                self.status_message = self
                    .worker
                    .last_command()
                    .map(|command| format!("Running: {}", command));
            }
            Err(BuildError::Validation(err)) => {
                self.dialog = Some(Dialog::Error {
                    title: "Invalid Options".to_string(),
                    message: err.to_string(),
                });
            }
            Err(err) => self.status_message = Some(err.to_string()),
        }
    }

    fn handle_command_result(&mut self, result: CommandResult) {
        match result {
            CommandResult::Quit => self.request_quit(),
            CommandResult::Build => self.start_build(),
            CommandResult::WriteLogs(file) => {
                self.status_message = Some(match self.write_logs(file) {
                    Ok(path) => format!("Wrote {}", path.display()),
                    Err(err) => format!("{:#}", err),
                });
            }
            CommandResult::ApplyFilter(filter) => {
                self.active_filter = Some(filter);
                self.scroll_console_to_bottom();
            }
            CommandResult::ClearFilter => {
                self.active_filter = None;
                self.scroll_console_to_bottom();
            }
            CommandResult::ClearLog => self.clear_log(),
            CommandResult::SetTheme(theme) => self.theme = theme,
            CommandResult::GotoLine(line_number) => self.goto_line(line_number),
            CommandResult::Unknown(cmd) => {
                self.status_message = Some(format!("Unknown command: {}", cmd));
            }
        }
    }

    fn clear_log(&mut self) {
        self.log_entries.clear();
        self.console_scroll_state.select(None);
        self.auto_scroll = true;
    }

    /// `.json` targets get a full report, anything else the raw log text.
    /// Without a name the log goes to the configured save directory.
    fn write_logs(&self, file: Option<String>) -> Result<PathBuf> {
        let path = match file {
            Some(name) => Config::expand_path(&name),
            None => self.config.log_directory().join(format!(
                "build_log_{}.txt",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            )),
        };

        if path.extension().map_or(false, |ext| ext == "json") {
            self.report().save(&path)?;
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            write_log_text(&path, &self.log_entries)?;
        }

        Ok(path)
    }

    fn filtered_entries(&self) -> Vec<&LogEntry> {
        match &self.active_filter {
            Some(filter) => self.log_entries.iter().filter(|e| filter.matches(e)).collect(),
            None => self.log_entries.iter().collect(),
        }
    }

    fn yank_current_line(&mut self) {
        let entries = self.filtered_entries();
        let entry = match self.console_scroll_state.selected() {
            Some(index) if !self.auto_scroll => entries.get(index).copied(),
            _ => entries.last().copied(),
        };

        let Some(line) = entry.map(|e| e.raw_line.clone()) else {
            return;
        };

        self.status_message = Some(match copy_to_clipboard(&line) {
            Ok(()) => "Copied line to clipboard".to_string(),
            Err(err) => format!("{:#}", err),
        });
    }

    fn page_size(&self) -> usize {
        (self.console_viewport_height.saturating_sub(2) as usize).max(1)
    }

    fn half_page(&self) -> usize {
        (self.console_viewport_height / 2).max(1) as usize
    }

    fn scroll_console_up(&mut self, amount: usize) {
        self.auto_scroll = false;
        let selected = self.console_scroll_state.selected().unwrap_or(0);
        self.console_scroll_state
            .select(Some(selected.saturating_sub(amount)));
    }

    fn scroll_console_down(&mut self, amount: usize) {
        let count = self.filtered_entries().len();
        if count == 0 {
            return;
        }

        let selected = self.console_scroll_state.selected().unwrap_or(0);
        let new_selected = (selected + amount).min(count - 1);
        self.auto_scroll = new_selected >= count - 1;
        self.console_scroll_state.select(Some(new_selected));
    }

    fn scroll_console_to_bottom(&mut self) {
        self.auto_scroll = true;
        let count = self.filtered_entries().len();
        self.console_scroll_state
            .select(count.checked_sub(1));
    }

    fn goto_line(&mut self, line_number: usize) {
        let count = self.filtered_entries().len();
        if count == 0 || line_number == 0 {
            return;
        }

        let target = (line_number - 1).min(count - 1);
        self.console_scroll_state.select(Some(target));
        self.auto_scroll = false;
    }

    fn jump_to_search_match(&mut self, forward: bool) {
        let Some(pattern) = self.vim_mode.search_pattern.clone() else {
            return;
        };

        let matches: Vec<usize> = self
            .filtered_entries()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.raw_line.contains(pattern.as_str()))
            .map(|(i, _)| i)
            .collect();

        let current = self.console_scroll_state.selected();
        let target = if forward {
            matches
                .iter()
                .copied()
                .find(|&i| current.map_or(true, |c| i > c))
                .or_else(|| matches.first().copied())
        } else {
            matches
                .iter()
                .rev()
                .copied()
                .find(|&i| current.map_or(true, |c| i < c))
                .or_else(|| matches.last().copied())
        };

        match target {
            Some(index) => {
                self.console_scroll_state.select(Some(index));
                self.auto_scroll = false;
            }
            None => self.status_message = Some(format!("Pattern not found: {}", pattern)),
        }
    }

    fn update_console_scroll(&mut self) {
        if self.auto_scroll {
            let count = self.filtered_entries().len();
            self.console_scroll_state.select(count.checked_sub(1));
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let palette = self.palette();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.bg_base).fg(palette.text)),
            frame.size(),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.size());

        self.render_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(body[0]);

        let editing = self.vim_mode.mode == InputMode::Editing;
        FormTab::new(
            self.current_tab,
            &self.form,
            self.selected_field,
            editing,
            palette,
        )
        .render(frame, left[0]);
        self.render_build_button(frame, left[1]);

        self.console_viewport_height = body[1].height.saturating_sub(2);
        self.update_console_scroll();
        let console = ConsoleTab::new(
            &self.log_entries,
            self.active_filter.as_deref(),
            self.vim_mode.search_pattern.as_deref(),
            palette,
            self.config.display.show_timestamps,
        );
        console.render(frame, body[1], &mut self.console_scroll_state);

        self.render_footer(frame, chunks[2]);

        if let Some(dialog) = &self.dialog {
            render_dialog(frame, dialog, palette);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let palette = self.palette();
        let title = Span::styled(
            " Kiln ",
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        );

        let mut spans = vec![title];
        for tab in TabId::all() {
            let style = if tab == self.current_tab {
                Style::default()
                    .fg(palette.primary)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(palette.text_dim)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[Alt+{}] {}", tab.index() + 1, tab.title()),
                style,
            ));
        }
        spans.push(Span::styled(
            format!("   theme: {}", self.theme),
            Style::default().fg(palette.text_disabled),
        ));

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.border))
                .style(Style::default().bg(palette.bg_raised)),
        );

        frame.render_widget(header, area);
    }

    fn render_build_button(&self, frame: &mut Frame, area: Rect) {
        let palette = self.palette();
        let (label, style) = match self.worker.state() {
            BuildState::Running => (
                " Building... ",
                Style::default()
                    .fg(palette.text_disabled)
                    .bg(palette.primary_disabled),
            ),
            _ => (
                " Build Executable [b] ",
                Style::default()
                    .fg(palette.text_on_primary)
                    .bg(palette.primary)
                    .add_modifier(Modifier::BOLD),
            ),
        };

        let outcome = match &self.last_outcome {
            Some(outcome) if outcome.success => {
                Span::styled(" ok ", Style::default().fg(palette.success))
            }
            Some(_) => Span::styled(" failed ", Style::default().fg(palette.error)),
            None => Span::raw(""),
        };

        let button = Paragraph::new(Line::from(vec![Span::styled(label, style), outcome]))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.border)),
            );

        frame.render_widget(button, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let palette = self.palette();
        let text = match self.vim_mode.mode {
            InputMode::Normal => match &self.status_message {
                Some(message) => message.clone(),
                None => "q: Quit | j/k: Field | Enter: Edit/Toggle | b/F5: Build | t: Theme | c: Clear | y: Copy | :: Cmd | /: Search"
                    .to_string(),
            },
            InputMode::Editing => format!(
                "-- EDIT {} -- Esc: Done | Ctrl+U: Clear field",
                self.current_field().label()
            ),
            InputMode::Command => format!(":{}", self.vim_mode.input_buffer),
            InputMode::Search => format!("/{}", self.vim_mode.input_buffer),
        };

        let footer = Paragraph::new(text)
            .style(Style::default().fg(palette.text_dim))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette.border)),
            );

        frame.render_widget(footer, area);
    }
}

fn render_dialog(frame: &mut Frame, dialog: &Dialog, palette: &Palette) {
    let (title, message, accent) = match dialog {
        Dialog::ConfirmQuit => (
            " Build Running ",
            "A build is still running. Quit anyway? (y/N)".to_string(),
            palette.warning,
        ),
        Dialog::Error { title, message } => (
            title.as_str(),
            format!("{}\n\nPress any key to close.", message),
            palette.error,
        ),
    };

    let area = centered_rect(60, 30, frame.size());
    let popup = Paragraph::new(message)
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(palette.text).bg(palette.bg_raised))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(accent))
                .title(Title::from(format!(" {} ", title.trim())).alignment(Alignment::Center)),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::entry::LogLevel;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_command(app: &mut App, command: &str) {
        press(app, KeyCode::Char(':'));
        for c in command.chars() {
            press(app, KeyCode::Char(c));
        }
        press(app, KeyCode::Enter);
    }

    fn app() -> App {
        App::new(Config::default(), &BuildOptions::default())
    }

    #[test]
    fn test_toggle_and_edit_fields() {
        let mut app = app();

        // Basic tab: move down to the one-file toggle.
        for _ in 0..6 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.current_field(), FieldId::OneFile);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.form.flag(FieldId::OneFile), Some(false));

        app.selected_field = 1;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.vim_mode.mode, InputMode::Editing);
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        for c in "Tool".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.form.text(FieldId::AppName), Some("Tool"));
        assert_eq!(app.vim_mode.mode, InputMode::Normal);
    }

    #[test]
    fn test_invalid_options_open_dialog_without_building() {
        let mut app = app();
        press(&mut app, KeyCode::Char('b'));

        assert!(matches!(app.dialog, Some(Dialog::Error { .. })));
        assert_eq!(app.worker.state(), BuildState::Idle);
        assert!(app.worker.last_command().is_none());

        press(&mut app, KeyCode::Char('x'));
        assert!(app.dialog.is_none());
    }

    #[test]
    fn test_quit_when_idle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_log_is_capped() {
        let mut config = Config::default();
        config.display.max_log_lines = 3;
        let mut app = App::new(config, &BuildOptions::default());

        for i in 0..5 {
            app.push_log(LogEntry::tagged(LogLevel::Info, format!("line {}", i)));
        }

        let lines: Vec<&str> = app.log_entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_commands_change_theme_and_filter() {
        let mut app = app();
        type_command(&mut app, "theme dark");
        assert_eq!(app.theme, ThemeName::Dark);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.theme, ThemeName::Light);

        app.push_log(LogEntry::tagged(LogLevel::Info, "info"));
        app.push_log(LogEntry::tagged(LogLevel::Error, "boom"));
        type_command(&mut app, "filter level=error");
        assert_eq!(app.filtered_entries().len(), 1);

        type_command(&mut app, "nf");
        assert_eq!(app.filtered_entries().len(), 2);

        type_command(&mut app, "clear");
        assert!(app.log_entries.is_empty());
    }

    #[test]
    fn test_search_jumps_between_matches() {
        let mut app = app();
        for line in ["alpha", "needle one", "beta", "needle two"] {
            app.push_log(LogEntry::tagged(LogLevel::Info, line));
        }

        press(&mut app, KeyCode::Char('/'));
        for c in "needle".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.console_scroll_state.selected(), Some(1));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.console_scroll_state.selected(), Some(3));

        press(&mut app, KeyCode::Char('N'));
        assert_eq!(app.console_scroll_state.selected(), Some(1));
    }

    #[test]
    fn test_write_logs_as_text_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.push_log(LogEntry::tagged(LogLevel::Info, "Starting"));

        let text = dir.path().join("out").join("build.log");
        let path = app
            .write_logs(Some(text.display().to_string()))
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[INFO] Starting");

        let json = dir.path().join("build.json");
        app.write_logs(Some(json.display().to_string())).unwrap();
        let report = BuildReport::load(&json).unwrap();
        assert_eq!(report.entries.len(), 1);
        assert!(report.outcome.is_none());
    }

    #[test]
    fn test_failed_outcome_opens_dialog() {
        let mut app = app();
        app.finish_build(BuildOutcome::exited(1));

        match &app.dialog {
            Some(Dialog::Error { message, .. }) => {
                assert_eq!(message, "Build failed with return code 1")
            }
            other => panic!("unexpected dialog: {:?}", other),
        }
    }

    #[test]
    fn test_render_does_not_panic() {
        let mut app = app();
        app.push_log(LogEntry::tagged(LogLevel::Warning, "careful"));
        app.dialog = Some(Dialog::ConfirmQuit);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        app.select_tab(TabId::Packages);
        terminal.draw(|f| app.render(f)).unwrap();
    }
}
