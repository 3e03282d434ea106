use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use super::TabId;
use crate::theme::Palette;
use crate::tui::form::{FieldId, FieldKind, FormState};

pub struct FormTab<'a> {
    tab: TabId,
    form: &'a FormState,
    selected: usize,
    editing: bool,
    palette: &'a Palette,
}

impl<'a> FormTab<'a> {
    pub fn new(
        tab: TabId,
        form: &'a FormState,
        selected: usize,
        editing: bool,
        palette: &'a Palette,
    ) -> Self {
        Self {
            tab,
            form,
            selected,
            editing,
            palette,
        }
    }

    fn field_height(id: FieldId) -> Constraint {
        match id.kind() {
            FieldKind::Toggle => Constraint::Length(1),
            FieldKind::Text => Constraint::Length(3),
            FieldKind::MultiLine => Constraint::Min(5),
        }
    }

    fn border_style(&self, is_selected: bool) -> Style {
        if is_selected && self.editing {
            Style::default().fg(self.palette.primary).add_modifier(Modifier::BOLD)
        } else if is_selected {
            Style::default().fg(self.palette.primary)
        } else {
            Style::default().fg(self.palette.border)
        }
    }

    fn render_toggle(&self, frame: &mut Frame, area: Rect, id: FieldId, is_selected: bool) {
        let checked = self.form.flag(id).unwrap_or(false);
        let overridden = id == FieldId::DisableUpx && self.form.upx_dir_overrides();

        let mark = if checked { "[x]" } else { "[ ]" };
        let label_style = if overridden {
            Style::default().fg(self.palette.text_disabled)
        } else if is_selected {
            Style::default()
                .fg(self.palette.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.text)
        };

        let mut spans = vec![
            Span::styled(if is_selected { "> " } else { "  " }, label_style),
            Span::styled(format!("{} {}", mark, id.label()), label_style),
        ];
        if overridden {
            spans.push(Span::styled(
                "  (ignored: UPX directory set)",
                Style::default().fg(self.palette.text_disabled),
            ));
        } else if is_selected && !id.hint().is_empty() {
            spans.push(Span::styled(
                format!("  {}", id.hint()),
                Style::default().fg(self.palette.text_dim),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_text(&self, frame: &mut Frame, area: Rect, id: FieldId, is_selected: bool) {
        let value = self.form.text(id).unwrap_or_default();
        let editing = is_selected && self.editing;

        let mut lines: Vec<Line> = if value.is_empty() && !editing {
            vec![Line::from(Span::styled(
                id.hint(),
                Style::default()
                    .fg(self.palette.text_disabled)
                    .add_modifier(Modifier::ITALIC),
            ))]
        } else {
            value
                .split('\n')
                .map(|l| Line::from(Span::styled(l, Style::default().fg(self.palette.text))))
                .collect()
        };

        if editing {
            if let Some(last) = lines.last_mut() {
                last.spans.push(Span::styled(
                    "▏",
                    Style::default().fg(self.palette.primary),
                ));
            }
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.border_style(is_selected))
            .style(Style::default().bg(self.palette.bg_raised))
            .title(Title::from(format!(" {} ", id.label())).alignment(Alignment::Left));

        let mut paragraph = Paragraph::new(lines).block(block);
        if id.kind() == FieldKind::MultiLine {
            let inner_height = area.height.saturating_sub(2) as usize;
            let line_count = value.split('\n').count();
            let offset = line_count.saturating_sub(inner_height) as u16;
            paragraph = paragraph.scroll((offset, 0));
        } else {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }

        frame.render_widget(paragraph, area);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let fields = self.tab.fields();

        let outer = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.palette.border))
            .style(Style::default().bg(self.palette.bg_base))
            .title(
                Title::from(format!(" {} Options ", self.tab.title())).alignment(Alignment::Center),
            );
        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let mut constraints: Vec<Constraint> = fields.iter().map(|id| Self::field_height(*id)).collect();
        constraints.push(Constraint::Min(0));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (index, id) in fields.iter().enumerate() {
            let is_selected = index == self.selected;
            match id.kind() {
                FieldKind::Toggle => self.render_toggle(frame, chunks[index], *id, is_selected),
                FieldKind::Text | FieldKind::MultiLine => {
                    self.render_text(frame, chunks[index], *id, is_selected)
                }
            }
        }
    }
}
