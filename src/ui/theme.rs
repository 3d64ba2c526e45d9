//! Theme and styling configuration.

use std::sync::OnceLock;

use ratatui::style::Color;

/// Color theme for the application.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary foreground color.
    pub fg: Color,
    /// Secondary text (hints, placeholders, page counters).
    pub muted: Color,
    /// Accent color for focus and the current page.
    pub accent: Color,
    /// Border color for unfocused blocks.
    pub border: Color,
    /// Border color for focused blocks.
    pub border_focused: Color,
    /// Header row background.
    pub header_bg: Color,
    /// Selected row background.
    pub selection_bg: Color,
    /// Positive state (active switch, delivered order).
    pub success: Color,
    /// Pending state (shipped order, warnings).
    pub warning: Color,
    /// Destructive actions and errors.
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            muted: Color::DarkGray,
            accent: Color::Cyan,
            border: Color::Gray,
            border_focused: Color::Cyan,
            header_bg: Color::DarkGray,
            selection_bg: Color::Rgb(40, 60, 80),
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

static THEME: OnceLock<Theme> = OnceLock::new();

/// Get the active theme, initializing the default on first use.
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}
