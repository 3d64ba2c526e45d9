//! Toast notifications for mutation outcomes and recoverable errors.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::theme::theme;

/// Kind of notification, which sets its icon and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationType {
    /// Icon shown before the message.
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Info => "ℹ",
            NotificationType::Success => "✓",
            NotificationType::Warning => "⚠",
            NotificationType::Error => "✗",
        }
    }

    fn color(&self) -> Color {
        let t = theme();
        match self {
            NotificationType::Info => t.accent,
            NotificationType::Success => t.success,
            NotificationType::Warning => t.warning,
            NotificationType::Error => t.danger,
        }
    }

    fn default_duration(&self) -> Duration {
        match self {
            NotificationType::Info | NotificationType::Success => Duration::from_secs(3),
            NotificationType::Warning | NotificationType::Error => Duration::from_secs(5),
        }
    }
}

/// A single toast.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationType,
    created_at: Instant,
    duration: Duration,
}

impl Notification {
    /// Create a notification with the kind's default duration.
    pub fn new(message: impl Into<String>, kind: NotificationType) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at: Instant::now(),
            duration: kind.default_duration(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationType::Error)
    }

    /// Override the display duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the notification has outlived its duration.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

/// Queue of visible notifications, newest last.
#[derive(Debug)]
pub struct NotificationManager {
    notifications: VecDeque<Notification>,
    max_visible: usize,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    /// Create a manager showing at most three toasts.
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
            max_visible: 3,
        }
    }

    /// Add a notification, dropping the oldest past the limit.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
        while self.notifications.len() > self.max_visible {
            self.notifications.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::info(message));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::success(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Notification::warning(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::error(message));
    }

    /// Drop expired notifications. Called on each tick.
    pub fn tick(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Render the toasts stacked in the bottom-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let width = 48.min(area.width.saturating_sub(2));
        let inner_width = width.saturating_sub(4).max(1) as usize;
        let heights: Vec<u16> = self
            .notifications
            .iter()
            .map(|n| (n.message.chars().count() + 2).div_ceil(inner_width) as u16 + 2)
            .collect();
        let total_height = heights.iter().sum::<u16>().min(area.height.saturating_sub(2));

        let stack = Rect::new(
            area.x + area.width.saturating_sub(width + 1),
            area.y + area.height.saturating_sub(total_height + 1),
            width,
            total_height,
        );
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(heights.iter().map(|&h| Constraint::Length(h)))
            .split(stack);

        for (n, chunk) in self.notifications.iter().zip(chunks.iter()) {
            let style = Style::default().fg(n.kind.color());
            frame.render_widget(Clear, *chunk);
            let text = Line::from(vec![
                Span::styled(format!("{} ", n.kind.icon()), style.add_modifier(Modifier::BOLD)),
                Span::styled(n.message.clone(), style),
            ]);
            let paragraph = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).border_style(style))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, *chunk);
        }
    }
}
