//! Event handling for the application.
//!
//! Terminal input is polled by [`EventHandler`] and converted to [`Event`]s
//! that flow into `App::update`.

mod handler;
mod keys;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;
pub use keys::{get_context_hints, get_keybindings_grouped, KeyContext, Keybinding};

/// An application event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The left mouse button was pressed at `(column, row)`.
    Click(u16, u16),
    /// The terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for animations and expiry.
    Tick,
    /// The application should exit.
    Quit,
}
