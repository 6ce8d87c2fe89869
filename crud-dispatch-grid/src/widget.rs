//! The grid widget API the adapter drives

use crud_dispatch_core::{Record, RecordId};
use ratatui::layout::Rect;
use serde::{Deserialize, Serialize};

use crate::column::GridColumn;

/// How column widths are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridLayout {
    /// Size each column to its content.
    FitData,
    /// Size to content, then stretch the last column over the remaining width.
    #[default]
    FitDataStretch,
    /// Share the width evenly.
    FitColumns,
}

/// Who slices the data into pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationMode {
    /// The grid holds every row and shows one page at a time.
    Local,
    /// The grid holds one server page; changing page is the host's job.
    #[default]
    Remote,
}

/// What the footer counter counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaginationCounter {
    #[default]
    Rows,
    Pages,
}

/// Construction options of a grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridOptions {
    pub pagination: bool,
    pub pagination_mode: PaginationMode,
    pub layout: GridLayout,
    /// Let content-sized columns shrink when the table is too narrow.
    pub resizable_column_fit: bool,
    #[serde(rename = "paginationSize")]
    pub page_size: usize,
    #[serde(rename = "paginationInitialPage")]
    pub initial_page: usize,
    #[serde(rename = "paginationSizeSelector")]
    pub page_size_selector: Vec<usize>,
    #[serde(rename = "paginationCounter")]
    pub counter: PaginationCounter,
    /// Shown instead of rows while the first page loads.
    pub placeholder: String,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            pagination: false,
            pagination_mode: PaginationMode::Remote,
            layout: GridLayout::FitDataStretch,
            resizable_column_fit: true,
            page_size: 5,
            initial_page: 1,
            page_size_selector: vec![3, 6, 8, 10],
            counter: PaginationCounter::Rows,
            placeholder: "Loading Data".to_string(),
        }
    }
}

impl GridOptions {
    pub fn with_pagination(mut self, mode: PaginationMode) -> Self {
        self.pagination = true;
        self.pagination_mode = mode;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_layout(mut self, layout: GridLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }
}

/// Everything a grid is constructed from.
#[derive(Clone, Debug, Default)]
pub struct GridInit {
    /// Area the grid was mounted into.
    pub mount: Rect,
    pub columns: Vec<GridColumn>,
    pub data: Vec<Record>,
    pub options: GridOptions,
}

/// A table widget that rows can be pushed into.
///
/// Rows are matched by their `id` field with tolerant equality.
pub trait GridWidget {
    fn create(init: GridInit) -> Self
    where
        Self: Sized;

    /// Replace every row.
    fn set_data(&mut self, rows: Vec<Record>);

    /// Add rows after the existing ones.
    fn add_data(&mut self, rows: Vec<Record>);

    /// Replace rows that share an id with one of `rows`; others are ignored.
    fn update_data(&mut self, rows: Vec<Record>);

    /// Remove the row with `id`. Returns whether a row was removed.
    fn delete_row(&mut self, id: &RecordId) -> bool;

    fn set_columns(&mut self, columns: Vec<GridColumn>);

    fn rows(&self) -> &[Record];

    fn row(&self, id: &RecordId) -> Option<&Record> {
        self.rows().iter().find(|row| row.has_id(id))
    }

    /// Current page, starting at 1.
    fn page(&self) -> usize;

    /// Move to `page`. Remote grids only record it.
    fn set_page(&mut self, page: usize);

    fn page_size(&self) -> usize;
}
