//! Modal dialogs over the grid
//!
//! [`render_modal`] dims whatever was drawn so far and clears the dialog
//! area; [`ConfirmDialog`] is the yes/no prompt shown before deletes.

use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

use crate::component::Component;
use crate::event::EventKind;

/// Configuration for modal appearance
pub struct ModalStyle {
    /// Dim the background
    pub dim: bool,
    /// Background color for the modal area (None = cleared)
    pub bg_color: Option<Color>,
}

impl Default for ModalStyle {
    fn default() -> Self {
        Self {
            dim: true,
            bg_color: None,
        }
    }
}

impl ModalStyle {
    /// Create a style with a background color
    pub fn with_bg(bg_color: Color) -> Self {
        Self {
            bg_color: Some(bg_color),
            ..Default::default()
        }
    }
}

/// Prepare the frame for a modal
///
/// Call this AFTER rendering background content, then draw the dialog into
/// `area`.
pub fn render_modal(frame: &mut Frame, area: Rect, style: &ModalStyle) {
    if style.dim {
        let full = frame.area();
        frame
            .buffer_mut()
            .set_style(full, Style::default().add_modifier(Modifier::DIM));
    }
    frame.render_widget(Clear, area);

    if let Some(bg) = style.bg_color {
        frame.render_widget(BgFill(bg), area);
    }
}

/// Fills an area with a background color
struct BgFill(Color);

impl Widget for BgFill {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Style::default().bg(self.0));
    }
}

/// Calculate a centered rectangle within an area
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Props for ConfirmDialog component
pub struct ConfirmDialogProps<'a, A> {
    pub title: &'a str,
    pub message: &'a str,
    /// Emitted on y/enter
    pub on_confirm: A,
    /// Emitted on n/esc
    pub on_cancel: A,
}

/// A yes/no prompt drawn as a centered modal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfirmDialog;

impl<A> Component<A> for ConfirmDialog {
    type Props<'a> = ConfirmDialogProps<'a, A>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = A> {
        let EventKind::Key(key) = event else {
            return None;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Some(props.on_confirm),
            KeyCode::Char('n') | KeyCode::Esc => Some(props.on_cancel),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let width = u16::try_from(props.message.len() + 6)
            .unwrap_or(u16::MAX)
            .clamp(30, 60);
        let dialog = centered_rect(width, 6, area);
        render_modal(frame, dialog, &ModalStyle::default());

        let text = Text::from(vec![
            Line::raw(props.message),
            Line::raw(""),
            Line::styled("[y]es  [n]o", Style::default().fg(Color::DarkGray)),
        ]);
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", props.title))
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(paragraph, dialog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{key_event, RenderHarness};

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Yes,
        No,
    }

    fn props() -> ConfirmDialogProps<'static, TestAction> {
        ConfirmDialogProps {
            title: "Delete",
            message: "Delete 2 rows?",
            on_confirm: TestAction::Yes,
            on_cancel: TestAction::No,
        }
    }

    #[test]
    fn test_confirm_and_cancel() {
        let mut dialog = ConfirmDialog;

        let yes: Vec<_> = dialog.handle_event(&key_event("y"), props()).into_iter().collect();
        let no: Vec<_> = dialog.handle_event(&key_event("esc"), props()).into_iter().collect();
        let other: Vec<_> = dialog.handle_event(&key_event("x"), props()).into_iter().collect();

        assert_eq!(yes, vec![TestAction::Yes]);
        assert_eq!(no, vec![TestAction::No]);
        assert!(other.is_empty());
    }

    #[test]
    fn test_modal_renders_over_background() {
        let mut harness = RenderHarness::new(60, 12);

        let output = harness.render_to_string_plain(|frame| {
            frame.render_widget(Paragraph::new("Background content"), frame.area());
            ConfirmDialog.render(frame, frame.area(), props());
        });

        assert!(output.contains("Background content"));
        assert!(output.contains("Delete 2 rows?"));
        assert!(output.contains("[y]es  [n]o"));
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 80, 24);
        let centered = centered_rect(40, 10, area);

        assert_eq!(centered.width, 40);
        assert_eq!(centered.height, 10);
        assert_eq!(centered.x, 20);
        assert_eq!(centered.y, 7);
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let centered = centered_rect(100, 50, Rect::new(0, 0, 30, 10));

        assert!(centered.width <= 28);
        assert!(centered.height <= 8);
    }
}
