use crate::parser::entry::{LogEntry, LogLevel, LogSource};
use crate::parser::filters::LogFilter;
use crate::parser::keyword_spans;
use crate::theme::Palette;
use ratatui::layout::Alignment;
use ratatui::widgets::block::Title;
use ratatui::widgets::BorderType;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

pub struct ConsoleTab<'a> {
    log_entries: &'a [LogEntry],
    filter: Option<&'a dyn LogFilter>,
    search_pattern: Option<&'a str>,
    palette: &'a Palette,
    show_timestamps: bool,
}

impl<'a> ConsoleTab<'a> {
    pub fn new(
        log_entries: &'a [LogEntry],
        filter: Option<&'a dyn LogFilter>,
        search_pattern: Option<&'a str>,
        palette: &'a Palette,
        show_timestamps: bool,
    ) -> Self {
        Self {
            log_entries,
            filter,
            search_pattern,
            palette,
            show_timestamps,
        }
    }

    fn get_filtered_entries(&self) -> Vec<&'a LogEntry> {
        match self.filter {
            Some(filter) => self.log_entries.iter().filter(|e| filter.matches(e)).collect(),
            None => self.log_entries.iter().collect(),
        }
    }

    /// Tool output keeps the dim body colour unless it is a warning or error;
    /// kiln's own lines only colour their bracket keyword.
    fn body_style(&self, entry: &LogEntry) -> Style {
        let color = match (entry.source, entry.level) {
            (LogSource::Tool, LogLevel::Warning | LogLevel::Error) => {
                self.palette.level_color(entry.level)
            }
            _ => self.palette.text_dim,
        };
        Style::default().fg(color)
    }

    fn highlighted_spans(&self, entry: &'a LogEntry) -> Vec<Span<'a>> {
        let line = entry.raw_line.as_str();
        let body = self.body_style(entry);
        let mut spans = Vec::new();
        let mut cursor = 0;

        for (range, level) in keyword_spans(line) {
            if range.start > cursor {
                spans.push(Span::styled(&line[cursor..range.start], body));
            }
            spans.push(Span::styled(
                &line[range.clone()],
                Style::default()
                    .fg(self.palette.level_color(level))
                    .add_modifier(Modifier::BOLD),
            ));
            cursor = range.end;
        }

        if cursor < line.len() {
            spans.push(Span::styled(&line[cursor..], body));
        }

        spans
    }

    fn create_list_item(&self, entry: &'a LogEntry, index: usize, line_number_width: usize) -> ListItem<'a> {
        let line_number = index + 1;

        let mut content = vec![Span::styled(
            format!("{:>width$} ", line_number, width = line_number_width),
            Style::default().fg(self.palette.text_disabled),
        )];

        if self.show_timestamps {
            content.push(Span::styled(
                format!("[{}] ", entry.timestamp.format("%H:%M:%S")),
                Style::default().fg(self.palette.text_disabled),
            ));
        }

        content.extend(self.highlighted_spans(entry));

        let line = match self.search_pattern {
            Some(pattern) if !pattern.is_empty() && entry.raw_line.contains(pattern) => {
                Line::from(content).patch_style(Style::default().add_modifier(Modifier::REVERSED))
            }
            _ => Line::from(content),
        };

        ListItem::new(line)
    }

    fn build_title(&self) -> String {
        match self.filter {
            Some(filter) => format!(" Build Log ({}) ", filter.description()),
            None => " Build Log ".to_string(),
        }
    }

    fn create_block(&self, title: String) -> Block<'_> {
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.palette.border))
            .style(Style::default().bg(self.palette.bg_sunken))
            .title(Title::from(title).alignment(Alignment::Center))
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, state: &mut ListState) {
        let filtered_entries = self.get_filtered_entries();

        if filtered_entries.is_empty() {
            let list = List::new(Vec::<ListItem>::new())
                .block(self.create_block(" Build Log (empty) ".to_string()));
            frame.render_stateful_widget(list, area, state);
            return;
        }

        let line_number_width = filtered_entries.len().to_string().len().max(3);

        let items: Vec<ListItem> = filtered_entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.create_list_item(entry, index, line_number_width))
            .collect();

        let list = List::new(items)
            .block(self.create_block(self.build_title()))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        frame.render_stateful_widget(list, area, state);
    }
}
