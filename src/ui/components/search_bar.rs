//! Search bar for filtering table rows.
//!
//! Matching is case-insensitive and checks each of the configured record
//! fields for a substring match.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use super::record::Record;
use crate::ui::theme::theme;

/// What a key press did to the search bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    /// The query text changed; the owner should re-filter.
    QueryChanged,
    /// Editing finished; the query stays applied.
    Submit,
    /// Editing was abandoned and the query cleared.
    Clear,
}

/// Search state for a list view.
#[derive(Debug, Clone, Default)]
pub struct SearchBar {
    query: String,
    active: bool,
    placeholder: String,
    fields: Vec<String>,
}

impl SearchBar {
    /// Create a search bar matching against `fields`.
    pub fn new(placeholder: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            query: String::new(),
            active: false,
            placeholder: placeholder.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Start accepting input.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Check if the bar is accepting input.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The current query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Set the query directly.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Handle a key press while active.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<SearchAction> {
        if !self.active {
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.active = false;
                self.query.clear();
                Some(SearchAction::Clear)
            }
            (KeyCode::Enter, _) => {
                self.active = false;
                Some(SearchAction::Submit)
            }
            (KeyCode::Backspace, _) => self.query.pop().map(|_| SearchAction::QueryChanged),
            (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
                self.query.push(c);
                Some(SearchAction::QueryChanged)
            }
            _ => None,
        }
    }

    /// Whether a record matches the current query.
    ///
    /// An empty query matches everything.
    pub fn matches(&self, record: &Record) -> bool {
        let query = self.query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.fields
            .iter()
            .any(|field| record.get_str(field).to_lowercase().contains(&query))
    }

    /// Keep only the records matching the current query.
    pub fn filter(&self, records: &[Record]) -> Vec<Record> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// Render the bar in a single-line area.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let (text, style) = if self.query.is_empty() && !self.active {
            (format!("/ {}", self.placeholder), Style::default().fg(t.muted))
        } else if self.active {
            (format!("/ {}", self.query), Style::default().fg(t.warning))
        } else {
            (format!("/ {}", self.query), Style::default().fg(t.fg))
        };

        frame.render_widget(Paragraph::new(text).style(style), area);

        if self.active {
            frame.set_cursor_position(Position::new(
                area.x + 2 + self.query.chars().count() as u16,
                area.y,
            ));
        }
    }
}
