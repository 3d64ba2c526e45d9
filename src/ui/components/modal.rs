//! Modal dialog components.
//!
//! Dialogs are drawn on top of the current view. They carry no state beyond
//! whether they are visible and which button has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::error::AppError;
use crate::ui::theme::theme;

/// Compute a centered rectangle of the given size, clamped to `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Result of interacting with a confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// The user confirmed.
    Confirm,
    /// The user cancelled, pressed Esc, or clicked the backdrop.
    Cancel,
}

/// Which of the two buttons has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ConfirmButton {
    #[default]
    Cancel,
    Confirm,
}

/// A two-button Cancel/Confirm overlay.
///
/// Focus starts on Cancel so that a stray Enter never confirms.
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    visible: bool,
    title: String,
    message: String,
    confirm_label: String,
    focused: ConfirmButton,
    /// Areas recorded at the last render, for mouse hit testing.
    dialog_area: Option<Rect>,
    cancel_area: Option<Rect>,
    confirm_area: Option<Rect>,
}

impl ConfirmDialog {
    /// Create a hidden dialog.
    pub fn new() -> Self {
        Self {
            confirm_label: "Confirm".to_string(),
            ..Self::default()
        }
    }

    /// Show the dialog with the given text.
    pub fn show(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        confirm_label: impl Into<String>,
    ) {
        self.visible = true;
        self.title = title.into();
        self.message = message.into();
        self.confirm_label = confirm_label.into();
        self.focused = ConfirmButton::Cancel;
    }

    /// Hide the dialog.
    pub fn hide(&mut self) {
        self.visible = false;
        self.dialog_area = None;
        self.cancel_area = None;
        self.confirm_area = None;
    }

    /// Check if the dialog is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The dialog message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check whether the Confirm button currently has focus.
    pub fn is_confirm_focused(&self) -> bool {
        self.focused == ConfirmButton::Confirm
    }

    /// Handle keyboard input while visible.
    ///
    /// `y` confirms and `n`/Esc cancel directly. Enter activates the focused
    /// button; Tab and the arrow keys move focus.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<ConfirmAction> {
        if !self.visible {
            return None;
        }

        let action = match (key.code, key.modifiers) {
            (KeyCode::Esc, _)
            | (KeyCode::Char('n'), KeyModifiers::NONE)
            | (KeyCode::Char('q'), KeyModifiers::NONE) => Some(ConfirmAction::Cancel),
            (KeyCode::Char('y'), KeyModifiers::NONE) => Some(ConfirmAction::Confirm),
            (KeyCode::Enter, _) => Some(match self.focused {
                ConfirmButton::Cancel => ConfirmAction::Cancel,
                ConfirmButton::Confirm => ConfirmAction::Confirm,
            }),
            (KeyCode::Tab, _)
            | (KeyCode::BackTab, _)
            | (KeyCode::Left, _)
            | (KeyCode::Right, _)
            | (KeyCode::Char('h'), KeyModifiers::NONE)
            | (KeyCode::Char('l'), KeyModifiers::NONE) => {
                self.focused = match self.focused {
                    ConfirmButton::Cancel => ConfirmButton::Confirm,
                    ConfirmButton::Confirm => ConfirmButton::Cancel,
                };
                None
            }
            _ => None,
        };

        if action.is_some() {
            self.hide();
        }
        action
    }

    /// Handle a left click at terminal cell (`column`, `row`).
    ///
    /// Clicking a button activates it; clicking outside the dialog counts as
    /// a click on the backdrop and cancels.
    pub fn handle_click(&mut self, column: u16, row: u16) -> Option<ConfirmAction> {
        if !self.visible {
            return None;
        }
        let pos = Position::new(column, row);

        let action = if self.confirm_area.is_some_and(|r| r.contains(pos)) {
            Some(ConfirmAction::Confirm)
        } else if self.cancel_area.is_some_and(|r| r.contains(pos)) {
            Some(ConfirmAction::Cancel)
        } else if self.dialog_area.is_some_and(|r| !r.contains(pos)) {
            Some(ConfirmAction::Cancel)
        } else {
            None
        };

        if action.is_some() {
            self.hide();
        }
        action
    }

    /// Render the dialog centered over `area`.
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let t = theme();

        let dialog_area = centered_rect(52, 9, area);
        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.title),
                Style::default().fg(t.danger).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.danger));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(self.message.as_str())
                .style(Style::default().fg(t.fg))
                .wrap(Wrap { trim: true }),
            chunks[0],
        );

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let button_style = |focused: bool, color| {
            if focused {
                Style::default()
                    .fg(ratatui::style::Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            }
        };

        frame.render_widget(
            Paragraph::new(Line::from(" Cancel "))
                .alignment(Alignment::Center)
                .style(button_style(self.focused == ConfirmButton::Cancel, t.fg)),
            buttons[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(format!(" {} ", self.confirm_label)))
                .alignment(Alignment::Center)
                .style(button_style(self.focused == ConfirmButton::Confirm, t.danger)),
            buttons[1],
        );

        self.dialog_area = Some(dialog_area);
        self.cancel_area = Some(buttons[0]);
        self.confirm_area = Some(buttons[1]);
    }
}

/// Dialog for critical errors that need acknowledgment.
#[derive(Debug, Default)]
pub struct ErrorDialog {
    visible: bool,
    title: String,
    message: String,
    hint: Option<String>,
}

impl ErrorDialog {
    /// Create a hidden error dialog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show an application error.
    pub fn show(&mut self, error: &AppError) {
        self.visible = true;
        self.title = "Error".to_string();
        self.message = error.user_message();
        self.hint = error.suggested_action().map(str::to_string);
    }

    /// Show a custom message.
    pub fn show_message(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.visible = true;
        self.title = title.into();
        self.message = message.into();
        self.hint = None;
    }

    /// Hide the dialog.
    pub fn dismiss(&mut self) {
        self.visible = false;
    }

    /// Check if the dialog is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The message being shown.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render the dialog centered over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let t = theme();
        let dialog_area = centered_rect(60, 10, area);
        frame.render_widget(Clear, dialog_area);

        let mut lines = vec![Line::from(self.message.clone()), Line::default()];
        if let Some(hint) = &self.hint {
            lines.push(Line::from(Span::styled(hint.clone(), Style::default().fg(t.warning))));
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            "[Enter/Esc] dismiss",
            Style::default().fg(t.muted),
        )));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(format!(" {} ", self.title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(t.danger)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, dialog_area);
    }
}
