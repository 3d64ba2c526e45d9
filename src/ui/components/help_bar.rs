//! Contextual help bar.
//!
//! One line of shortcut hints for whatever currently has input focus.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::events::{get_context_hints, KeyContext};
use crate::ui::theme::theme;

/// Render the hints for `context`.
pub fn render_context_help(frame: &mut Frame, area: Rect, context: KeyContext) {
    let line = Line::from(parse_hints_to_spans(get_context_hints(context)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Split hint text into spans, styling bracketed keys apart from descriptions.
fn parse_hints_to_spans(hints: &str) -> Vec<Span<'static>> {
    let t = theme();
    let text_style = Style::default().fg(t.muted);
    let key_style = Style::default().fg(t.accent);

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_bracket = false;

    for c in hints.chars() {
        match c {
            '[' if !in_bracket => {
                if !current.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut current), text_style));
                }
                in_bracket = true;
                current.push(c);
            }
            ']' if in_bracket => {
                current.push(c);
                spans.push(Span::styled(std::mem::take(&mut current), key_style));
                in_bracket = false;
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        spans.push(Span::styled(current, text_style));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hints_to_spans_simple() {
        let hints = "[j/k] navigate";
        let spans = parse_hints_to_spans(hints);
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_parse_hints_to_spans_multiple_keys() {
        let hints = "[j/k] row  [Enter] menu  [?] help";
        let spans = parse_hints_to_spans(hints);
        assert_eq!(spans.len(), 6);
    }

    #[test]
    fn test_parse_hints_to_spans_empty() {
        let hints = "";
        let spans = parse_hints_to_spans(hints);
        assert!(spans.is_empty());
    }

    #[test]
    fn test_parse_hints_to_spans_no_brackets() {
        let hints = "just text";
        let spans = parse_hints_to_spans(hints);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_key_spans_keep_brackets() {
        let spans = parse_hints_to_spans("[d] delete");
        assert_eq!(spans[0].content, "[d]");
        assert_eq!(spans[1].content, " delete");
    }

    #[test]
    fn test_table_context_renders() {
        use ratatui::{backend::TestBackend, Terminal};

        let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();
        terminal
            .draw(|f| render_context_help(f, f.area(), KeyContext::Table))
            .unwrap();
        let line: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(line.starts_with("[j/k] row"));
    }
}
