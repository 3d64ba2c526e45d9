//! Read-only detail panel for a single row.
//!
//! Opened by a table's edit action. Field values are rendered with the same
//! formatters as the table columns so the panel agrees with the list.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::components::{centered_rect, Column, Record};
use crate::ui::theme::theme;

/// Actions returned by the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    Close,
}

/// A labelled view of one record.
#[derive(Debug, Default)]
pub struct DetailView {
    title: String,
    record: Option<Record>,
    fields: Vec<Column>,
}

impl DetailView {
    /// Create a panel that shows `fields` of whatever record it is given.
    pub fn new(title: impl Into<String>, fields: Vec<Column>) -> Self {
        Self {
            title: title.into(),
            record: None,
            fields,
        }
    }

    pub fn open(&mut self, record: Record) {
        self.record = Some(record);
    }

    pub fn close(&mut self) {
        self.record = None;
    }

    pub fn is_open(&self) -> bool {
        self.record.is_some()
    }

    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<DetailAction> {
        if !self.is_open() {
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Enter, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.close();
                Some(DetailAction::Close)
            }
            _ => None,
        }
    }

    fn lines(&self, record: &Record) -> Vec<Line<'static>> {
        let t = theme();
        let label_width = self
            .fields
            .iter()
            .map(|c| c.header.chars().count())
            .max()
            .unwrap_or(0);

        self.fields
            .iter()
            .map(|column| {
                let mut spans = vec![Span::styled(
                    format!("{:>width$}  ", column.header, width = label_width),
                    Style::default().fg(t.muted).add_modifier(Modifier::BOLD),
                )];
                spans.extend(column.render_cell(record).spans);
                Line::from(spans)
            })
            .collect()
    }

    /// Render centered over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(record) = &self.record else {
            return;
        };
        let t = theme();
        let height = (self.fields.len() as u16 + 2).min(area.height);
        let popup = centered_rect(70.min(area.width), height, area);

        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(self.lines(record))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(format!(" {} #{} ", self.title, record.key()))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(t.accent)),
            );
        frame.render_widget(paragraph, popup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::format::{currency, line_text};
    use ratatui::{backend::TestBackend, Terminal};

    fn panel() -> DetailView {
        DetailView::new(
            "Product",
            vec![
                Column::new("Name", "product_name"),
                Column::new("Price", "product_price").with_format(currency("NGN")),
            ],
        )
    }

    fn dates() -> Record {
        Record::new(42u64)
            .with("product_name", "Medjool Dates")
            .with("product_price", "1500")
    }

    #[test]
    fn test_open_and_close() {
        let mut view = panel();
        assert!(!view.is_open());
        assert_eq!(view.handle_input(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)), None);

        view.open(dates());
        assert!(view.is_open());
        assert_eq!(
            view.handle_input(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Some(DetailAction::Close)
        );
        assert!(view.record().is_none());
    }

    #[test]
    fn test_lines_use_column_formatters() {
        let view = panel();
        let lines = view.lines(&dates());
        assert_eq!(line_text(&lines[0]), " Name  Medjool Dates");
        assert_eq!(line_text(&lines[1]), "Price  NGN 1,500.00");
    }

    #[test]
    fn test_render_shows_title_with_key() {
        let mut view = panel();
        view.open(dates());
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal.draw(|f| view.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Product #42"));
        assert!(text.contains("NGN 1,500.00"));
    }
}
