//! Component trait for pure UI elements

use ratatui::{layout::Rect, Frame};

use crate::event::EventKind;

/// A UI component that renders based on props and emits actions
///
/// Components follow these rules:
/// 1. Props contain the read-only data needed for rendering
/// 2. `handle_event` returns actions, never mutates external state
/// 3. `render` is a function of props plus internal UI state
///
/// Internal UI state (cursor, checked rows, page of a local grid) can live in
/// `&mut self`, but data changes go through actions.
///
/// # Example
///
/// ```ignore
/// impl Component<AppAction> for DataGrid {
///     type Props<'a> = DataGridProps<'a, AppAction>;
///
///     fn handle_event(&mut self, event: &EventKind, props: Self::Props<'_>) -> impl IntoIterator<Item = AppAction> {
///         if let EventKind::Key(key) = event {
///             if key.code == KeyCode::Char('e') {
///                 return self.cursor_row().map(props.on_edit);
///             }
///         }
///         None
///     }
///
///     fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
///         frame.render_widget(self.table(&props), area);
///     }
/// }
/// ```
pub trait Component<A> {
    /// Data required to render the component (read-only)
    type Props<'a>;

    /// Handle an event and return actions to dispatch
    ///
    /// Returns any type implementing `IntoIterator<Item = A>`:
    /// - `None` - no actions (most common)
    /// - `Some(action)` - single action
    /// - `vec![...]` - multiple actions
    ///
    /// Default implementation returns no actions (render-only components).
    #[allow(unused_variables)]
    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = A> {
        None::<A>
    }

    /// Render the component to the frame
    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}
