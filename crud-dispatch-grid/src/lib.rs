//! Table adapter and data grid for crud-dispatch
//!
//! Store data reaches a table through a [`TableAdapter`], which owns one
//! widget implementing [`GridWidget`]. [`DataGrid`] is the ratatui
//! implementation; it also implements the [`Component`] trait, emitting
//! actions through callbacks passed in its props. [`ConfirmDialog`] is the
//! modal prompt shown before destructive actions.
//!
//! # Example
//!
//! ```ignore
//! use crud_dispatch_grid::{DataGrid, DataGridProps, GridOptions, TableAdapter};
//!
//! let mut table = TableAdapter::<DataGrid>::new();
//! table.initialize(area, &store.state().columns(), vec![], GridOptions::default());
//!
//! // After each store result:
//! table.mirror(&users, &action)?;
//!
//! // In your render function:
//! table.grid_mut()?.render(frame, area, DataGridProps {
//!     title: "Users",
//!     is_focused: true,
//!     loading: store.state().is_loading(&users.clone().into()),
//!     pagination: store.state().pagination(&users),
//!     on_edit: Action::Edit,
//!     on_delete: Action::Delete,
//!     on_page: Action::Page,
//! });
//! ```

pub mod adapter;
pub mod column;
pub mod component;
pub mod data_grid;
pub mod dialog;
pub mod event;
pub mod testing;
pub mod widget;

pub use adapter::{TableAdapter, TableError};
pub use column::{
    apply_columns, cell_text, row_index, CellContext, CellRenderer, GridColumn, ACTIONS_FIELD,
    INDEX_FIELD, SELECT_FIELD,
};
pub use component::Component;
pub use data_grid::{DataGrid, DataGridProps};
pub use dialog::{centered_rect, render_modal, ConfirmDialog, ConfirmDialogProps, ModalStyle};
pub use event::EventKind;
pub use widget::{GridInit, GridLayout, GridOptions, GridWidget, PaginationCounter, PaginationMode};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        centered_rect, render_modal, Component, ConfirmDialog, ConfirmDialogProps, DataGrid,
        DataGridProps, EventKind, GridOptions, GridWidget, ModalStyle, TableAdapter, TableError,
    };
}
