//! Key reference popup drawn from the binding table in `events::keys`.
//!
//! The section for the screen help was opened from is listed first.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::events::{get_keybindings_grouped, KeyContext, Keybinding};
use crate::logging;
use crate::ui::components::centered_rect;
use crate::ui::theme::theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpAction {
    Close,
}

#[derive(Debug, Default)]
pub struct HelpView {
    origin: Option<KeyContext>,
    scroll: u16,
}

impl HelpView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the reference for `context`, scrolled to the top.
    pub fn open(&mut self, context: KeyContext) {
        self.origin = Some(context);
        self.scroll = 0;
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Option<HelpAction> {
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => return Some(HelpAction::Close),
            KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            // Clamped to the content on the next render
            KeyCode::Char('G') | KeyCode::End => self.scroll = u16::MAX,
            _ => {}
        }
        None
    }

    fn sections(&self) -> Vec<(KeyContext, Vec<Keybinding>)> {
        let mut grouped = get_keybindings_grouped();
        let position = self
            .origin
            .and_then(|origin| grouped.iter().position(|(context, _)| *context == origin));
        if let Some(position) = position {
            let current = grouped.remove(position);
            grouped.insert(0, current);
        }
        grouped
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let t = theme();
        let mut lines = Vec::new();
        for (context, bindings) in self.sections() {
            let mut title = vec![Span::styled(
                context.display(),
                Style::default().fg(t.warning).add_modifier(Modifier::BOLD),
            )];
            if Some(context) == self.origin {
                title.push(Span::styled("  (here)", Style::default().fg(t.muted)));
            }
            lines.push(Line::from(title));

            let width = bindings.iter().map(|b| b.key.chars().count()).max().unwrap_or(0);
            lines.extend(bindings.into_iter().map(|binding| {
                Line::from(vec![
                    Span::styled(
                        format!("  {:<width$}  ", binding.key, width = width),
                        Style::default().fg(t.success).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(binding.description),
                ])
            }));
            lines.push(Line::default());
        }
        lines.pop();
        lines
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let t = theme();
        let lines = self.lines();
        let popup = centered_rect(72, area.height.saturating_sub(4), area);
        let visible = popup.height.saturating_sub(2);
        self.scroll = self.scroll.min((lines.len() as u16).saturating_sub(visible));

        let mut block = Block::default()
            .title(" Keys ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent));
        if let Some(dir) = logging::log_directory() {
            block = block.title_bottom(Line::styled(
                format!(" logs: {} ", dir.display()),
                Style::default().fg(t.muted),
            ));
        }

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).scroll((self.scroll, 0)).block(block), popup);
    }
}
