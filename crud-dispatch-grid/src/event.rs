//! Terminal events delivered to components

use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind};

/// The kind of event a component reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Keyboard event
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
}

impl EventKind {
    /// Convert a crossterm event, dropping what components never see
    /// (key releases, mouse, focus and paste events).
    pub fn from_crossterm(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                Some(EventKind::Key(key))
            }
            CrosstermEvent::Resize(w, h) => Some(EventKind::Resize(w, h)),
            _ => None,
        }
    }
}
