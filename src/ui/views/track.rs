//! Order tracking prompt.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::debug;

use crate::api::types::TrackedOrder;
use crate::ui::components::centered_rect;
use crate::ui::theme::theme;

const PROMPT: &str = "Tracking number: ";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Lookup {
    #[default]
    Idle,
    Searching(String),
    Found(TrackedOrder),
    NotFound(String),
    Failed,
}

/// A reference to look up, returned when the user submits the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest(pub String);

#[derive(Debug, Default)]
pub struct TrackOrderPanel {
    open: bool,
    reference: String,
    lookup: Lookup,
}

impl TrackOrderPanel {
    pub fn open(&mut self) {
        self.open = true;
        self.reference.clear();
        self.lookup = Lookup::Idle;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.lookup, Lookup::Searching(_))
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<TrackRequest> {
        if !self.open {
            return None;
        }
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => {
                self.open = false;
                None
            }
            (KeyCode::Enter, _) => {
                let reference = self.reference.trim().to_string();
                if reference.is_empty() || self.is_searching() {
                    return None;
                }
                debug!(reference = %reference, "Tracking order");
                self.lookup = Lookup::Searching(reference.clone());
                Some(TrackRequest(reference))
            }
            (KeyCode::Backspace, _) if !self.is_searching() => {
                self.reference.pop();
                None
            }
            (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT)
                if !self.is_searching() =>
            {
                self.reference.push(c);
                None
            }
            _ => None,
        }
    }

    /// Apply a lookup result. `Err(())` marks the lookup as failed.
    ///
    /// Ignored unless it answers the reference currently being searched.
    pub fn set_result(&mut self, reference: &str, result: Result<Option<TrackedOrder>, ()>) -> bool {
        match &self.lookup {
            Lookup::Searching(pending) if self.open && pending == reference => {}
            _ => {
                debug!(reference, "Dropping tracking result nobody is waiting for");
                return false;
            }
        }
        self.lookup = match result {
            Ok(Some(order)) => Lookup::Found(order),
            Ok(None) => Lookup::NotFound(reference.to_string()),
            Err(()) => Lookup::Failed,
        };
        true
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let t = theme();
        let label = Style::default().fg(t.muted);
        let field = |name: &str, value: &str| {
            Line::from(vec![
                Span::styled(format!("{:>14}  ", name), label.add_modifier(Modifier::BOLD)),
                Span::raw(value.to_string()),
            ])
        };

        let mut lines = vec![
            Line::from(vec![
                Span::styled(PROMPT, label),
                Span::styled(self.reference.clone(), Style::default().fg(t.warning)),
            ]),
            Line::default(),
        ];
        match &self.lookup {
            Lookup::Idle => lines.push(Line::styled("Enter the order reference and press Enter", label)),
            Lookup::Searching(_) => lines.push(Line::styled("Tracking…", label)),
            Lookup::Failed => lines.push(Line::styled(
                "Failed to fetch order details. Please try again.",
                Style::default().fg(t.danger),
            )),
            Lookup::NotFound(reference) => lines.push(Line::styled(
                format!("No order found for {}", reference),
                Style::default().fg(t.warning),
            )),
            Lookup::Found(order) => {
                lines.push(Line::styled(
                    "Order summary",
                    Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
                ));
                lines.push(field("Order ID", &order.trans_reference));
                lines.push(field("Customer name", &order.register_name));
                lines.push(field("Seller name", &order.sender_name));
            }
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.open {
            return;
        }
        let t = theme();
        let lines = self.lines();
        let popup = centered_rect(64, lines.len() as u16 + 2, area);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .title(" Track order ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(t.accent)),
            ),
            popup,
        );
        if !self.is_searching() {
            let column = popup.x + 1 + (PROMPT.len() + self.reference.chars().count()) as u16;
            if column < popup.right().saturating_sub(1) {
                frame.set_cursor_position(Position::new(column, popup.y + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn type_text(panel: &mut TrackOrderPanel, text: &str) {
        for c in text.chars() {
            panel.handle_input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn enter(panel: &mut TrackOrderPanel) -> Option<TrackRequest> {
        panel.handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
    }

    fn found() -> TrackedOrder {
        TrackedOrder {
            trans_reference: "HN-889".to_string(),
            register_name: "Aisha Bello".to_string(),
            sender_name: "Barakah Foods".to_string(),
        }
    }

    #[test]
    fn test_empty_reference_is_not_submitted() {
        let mut panel = TrackOrderPanel::default();
        panel.open();
        type_text(&mut panel, "  ");
        assert_eq!(enter(&mut panel), None);
        assert!(!panel.is_searching());
    }

    #[test]
    fn test_submit_then_result() {
        let mut panel = TrackOrderPanel::default();
        panel.open();
        type_text(&mut panel, "HN-889");
        assert_eq!(enter(&mut panel), Some(TrackRequest("HN-889".to_string())));
        // No second request while one is in flight
        assert_eq!(enter(&mut panel), None);
        type_text(&mut panel, "x");

        assert!(!panel.set_result("HN-000", Ok(None)));
        assert!(panel.set_result("HN-889", Ok(Some(found()))));
        assert_eq!(panel.lookup, Lookup::Found(found()));
    }

    #[test]
    fn test_result_after_close_is_dropped() {
        let mut panel = TrackOrderPanel::default();
        panel.open();
        type_text(&mut panel, "HN-1");
        enter(&mut panel);
        panel.handle_input(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!panel.is_open());
        assert!(!panel.set_result("HN-1", Err(())));
    }

    #[test]
    fn test_render_found_order() {
        let mut panel = TrackOrderPanel::default();
        panel.open();
        type_text(&mut panel, "HN-889");
        enter(&mut panel);
        panel.set_result("HN-889", Ok(Some(found())));

        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|f| panel.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Track order"));
        assert!(text.contains("Aisha Bello"));
        assert!(text.contains("Barakah Foods"));
    }
}
