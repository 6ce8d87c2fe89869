//! Feeds store data into a grid widget
//!
//! The adapter owns the one grid it constructed. Every call made before
//! [`initialize`](TableAdapter::initialize) fails with
//! [`TableError::NotInitialized`].
//!
//! ```ignore
//! let mut adapter = TableAdapter::<DataGrid>::new();
//! adapter.initialize(area, &store.state().columns(), store.state().main_items().to_vec(), GridOptions::default());
//!
//! while let Some(action) = store.process_next().await {
//!     adapter.mirror(&users, &action)?;
//! }
//! ```

use crud_dispatch_core::{ColumnConfig, Record, RecordId, ResourceKey, StoreAction};
use ratatui::layout::Rect;
use thiserror::Error;

use crate::column::{apply_columns, GridColumn};
use crate::data_grid::DataGrid;
use crate::widget::{GridInit, GridOptions, GridWidget};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    #[error("the table has not been initialized")]
    NotInitialized,
}

/// Owner of one grid widget.
pub struct TableAdapter<G = DataGrid> {
    grid: Option<G>,
}

impl<G> Default for TableAdapter<G> {
    fn default() -> Self {
        Self { grid: None }
    }
}

impl<G: GridWidget> TableAdapter<G> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct the grid. A grid built earlier is replaced.
    pub fn initialize(
        &mut self,
        mount: Rect,
        columns: &[ColumnConfig],
        data: Vec<Record>,
        options: GridOptions,
    ) -> &mut G {
        if self.grid.is_some() {
            tracing::debug!("Replacing initialized table");
        }
        let grid = G::create(GridInit {
            mount,
            columns: Self::apply_columns(columns),
            data,
            options,
        });
        self.grid.insert(grid)
    }

    pub fn is_initialized(&self) -> bool {
        self.grid.is_some()
    }

    pub fn grid(&self) -> Result<&G, TableError> {
        self.grid.as_ref().ok_or(TableError::NotInitialized)
    }

    pub fn grid_mut(&mut self) -> Result<&mut G, TableError> {
        self.grid.as_mut().ok_or(TableError::NotInitialized)
    }

    /// Column configurations as grid columns.
    pub fn apply_columns(columns: &[ColumnConfig]) -> Vec<GridColumn> {
        apply_columns(columns)
    }

    pub fn set_columns(&mut self, columns: &[ColumnConfig]) -> Result<(), TableError> {
        self.grid_mut()?.set_columns(Self::apply_columns(columns));
        Ok(())
    }

    pub fn append_rows(&mut self, rows: Vec<Record>) -> Result<(), TableError> {
        self.grid_mut()?.add_data(rows);
        Ok(())
    }

    pub fn replace_rows(&mut self, rows: Vec<Record>) -> Result<(), TableError> {
        self.grid_mut()?.set_data(rows);
        Ok(())
    }

    pub fn update_row(&mut self, row: Record) -> Result<(), TableError> {
        self.grid_mut()?.update_data(vec![row]);
        Ok(())
    }

    /// Remove the rows with the given ids. Returns how many were removed.
    pub fn remove_rows(&mut self, ids: &[RecordId]) -> Result<usize, TableError> {
        let grid = self.grid_mut()?;
        Ok(ids.iter().filter(|id| grid.delete_row(id)).count())
    }

    /// Forward an applied store result for `key` into the grid.
    ///
    /// Returns whether the grid changed. Actions for other resources and
    /// actions that carry no rows are ignored.
    pub fn mirror(&mut self, key: &ResourceKey, action: &StoreAction) -> Result<bool, TableError> {
        if action.key() != Some(key) {
            return Ok(false);
        }
        match action {
            StoreAction::ListDidLoad { page, .. } => {
                let grid = self.grid_mut()?;
                grid.set_data(page.data.clone());
                grid.set_page(usize::try_from(page.current_page).unwrap_or(1).max(1));
            }
            StoreAction::ItemsSet { records, .. } => self.replace_rows(records.clone())?,
            StoreAction::RecordDidCreate { record, .. } => self.append_rows(vec![record.clone()])?,
            StoreAction::RecordDidUpdate { record, .. } => self.update_row(record.clone())?,
            StoreAction::RecordDidDelete { remove, .. } => {
                self.remove_rows(std::slice::from_ref(remove))?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}
