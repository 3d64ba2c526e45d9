//! Loading indicator component.
//!
//! Shows an animated spinner while a fetch or mutation is in flight.

use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use crate::ui::theme::theme;

/// Spinner animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// A loading indicator with an animated spinner.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    message: String,
    frame: usize,
    active: bool,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingIndicator {
    /// Create an inactive indicator.
    pub fn new() -> Self {
        Self::with_message("Loading...")
    }

    /// Create an inactive indicator with a custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frame: 0,
            active: false,
        }
    }

    /// Get the current message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Start the indicator.
    pub fn start(&mut self) {
        self.active = true;
        self.frame = 0;
    }

    /// Start with a specific message.
    pub fn start_with_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.start();
    }

    /// Stop the indicator.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Check if the indicator is active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the spinner. Called on each tick.
    pub fn tick(&mut self) {
        if self.active {
            self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    /// The current spinner frame.
    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.frame]
    }

    /// The indicator text, empty while inactive.
    pub fn text(&self) -> String {
        if self.active {
            format!("{} {}", self.spinner_frame(), self.message)
        } else {
            String::new()
        }
    }

    /// Render right-aligned in the given area.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.active {
            return;
        }
        let paragraph = Paragraph::new(self.text())
            .style(Style::default().fg(theme().accent))
            .alignment(Alignment::Right);
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_inactive() {
        let loading = LoadingIndicator::new();
        assert!(!loading.is_active());
        assert!(loading.text().is_empty());
    }

    #[test]
    fn test_start_with_message() {
        let mut loading = LoadingIndicator::new();
        loading.start_with_message("Loading products...");
        assert!(loading.is_active());
        assert_eq!(loading.message(), "Loading products...");
        assert!(loading.text().ends_with("Loading products..."));
    }

    #[test]
    fn test_tick_wraps_around() {
        let mut loading = LoadingIndicator::new();
        loading.start();
        for _ in 0..SPINNER_FRAMES.len() {
            loading.tick();
        }
        assert_eq!(loading.spinner_frame(), SPINNER_FRAMES[0]);
    }

    #[test]
    fn test_tick_inactive_does_not_advance() {
        let mut loading = LoadingIndicator::new();
        loading.tick();
        assert_eq!(loading.spinner_frame(), SPINNER_FRAMES[0]);
    }
}
