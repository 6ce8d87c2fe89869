//! Table widget for store records

use crossterm::event::KeyCode;
use crud_dispatch_core::{Pagination, Record, RecordId};
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::column::{cell_text, CellContext, GridColumn};
use crate::component::Component;
use crate::event::EventKind;
use crate::widget::{GridInit, GridLayout, GridOptions, GridWidget, PaginationCounter, PaginationMode};

/// Props for DataGrid component
pub struct DataGridProps<'a, A> {
    pub title: &'a str,
    /// Whether this component has focus
    pub is_focused: bool,
    /// Whether the rows are being (re)loaded
    pub loading: bool,
    /// Server pagination of the shown resource, for remote grids
    pub pagination: Option<&'a Pagination>,
    /// Edit the row under the cursor
    pub on_edit: fn(Record) -> A,
    /// Delete the checked rows, or the row under the cursor when none are checked
    pub on_delete: fn(Vec<RecordId>) -> A,
    /// Load another server page
    pub on_page: fn(usize) -> A,
}

/// A paged table of records with row selection
///
/// Handles j/k/up/down to move, n/p to change page, +/- to change page size,
/// space to check a row, e/enter to edit and d/delete to delete.
#[derive(Debug, Clone)]
pub struct DataGrid {
    mount: Rect,
    columns: Vec<GridColumn>,
    rows: Vec<Record>,
    options: GridOptions,
    page: usize,
    page_size: usize,
    /// Index into the visible rows
    cursor: usize,
    checked: Vec<RecordId>,
}

impl DataGrid {
    pub fn mount(&self) -> Rect {
        self.mount
    }

    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn checked(&self) -> &[RecordId] {
        &self.checked
    }

    fn pages_locally(&self) -> bool {
        self.options.pagination && self.options.pagination_mode == PaginationMode::Local
    }

    /// Number of local pages; always at least 1.
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    /// Rows on the current page.
    pub fn visible_rows(&self) -> &[Record] {
        if !self.pages_locally() {
            return &self.rows;
        }
        let start = ((self.page - 1) * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn cursor_row(&self) -> Option<&Record> {
        self.visible_rows().get(self.cursor)
    }

    fn is_checked(&self, row: &Record) -> bool {
        row.id().is_some_and(|id| self.checked.contains(&id))
    }

    fn toggle_checked(&mut self) {
        let Some(id) = self.cursor_row().and_then(Record::id) else {
            return;
        };
        match self.checked.iter().position(|checked| *checked == id) {
            Some(i) => {
                self.checked.remove(i);
            }
            None => self.checked.push(id),
        }
    }

    fn clamp(&mut self) {
        if self.pages_locally() {
            self.page = self.page.min(self.page_count());
        }
        let visible = self.visible_rows().len();
        self.cursor = self.cursor.min(visible.saturating_sub(1));

        let rows = &self.rows;
        self.checked
            .retain(|id| rows.iter().any(|row| row.has_id(id)));
    }

    /// Rows per page for numbering. Remote pages are sized by the server:
    /// a full page by its row count, the last page from what precedes it.
    fn effective_page_size(&self, pagination: Option<&Pagination>) -> usize {
        if self.pages_locally() {
            return self.page_size;
        }
        let shown = self.rows.len();
        let size = match pagination {
            Some(p) if p.last_page > 1 && p.current_page >= p.last_page => {
                let before = usize::try_from(p.total)
                    .unwrap_or(usize::MAX)
                    .saturating_sub(shown);
                let pages_before = usize::try_from(p.last_page - 1).unwrap_or(usize::MAX);
                before / pages_before
            }
            _ => shown,
        };
        size.max(1)
    }

    fn step_page_size(&mut self, grow: bool) {
        let selector = &self.options.page_size_selector;
        let next = if grow {
            selector.iter().copied().filter(|&s| s > self.page_size).min()
        } else {
            selector.iter().copied().filter(|&s| s < self.page_size).max()
        };
        if let Some(size) = next.filter(|&s| s > 0) {
            self.page_size = size;
            self.clamp();
        }
    }

    fn widths(&self, columns: &[&GridColumn], cells: &[Vec<String>]) -> Vec<Constraint> {
        let last = columns.len().saturating_sub(1);
        columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                if let Some(width) = column.width {
                    return Constraint::Length(width);
                }
                let content = cells
                    .iter()
                    .map(|row| Line::raw(row[i].as_str()).width())
                    .chain(std::iter::once(Line::raw(column.title.as_str()).width()))
                    .max()
                    .unwrap_or(0);
                let content = u16::try_from(content).unwrap_or(u16::MAX);

                match self.options.layout {
                    GridLayout::FitColumns => Constraint::Fill(1),
                    GridLayout::FitDataStretch if i == last => Constraint::Fill(1),
                    _ if self.options.resizable_column_fit => Constraint::Max(content),
                    _ => Constraint::Length(content),
                }
            })
            .collect()
    }

    fn counter(&self, pagination: Option<&Pagination>) -> Option<String> {
        if !self.options.pagination && pagination.is_none() {
            return None;
        }
        let shown = self.visible_rows().len();
        let (total, last_page) = match (self.pages_locally(), pagination) {
            (false, Some(p)) => (
                usize::try_from(p.total).unwrap_or(usize::MAX),
                usize::try_from(p.last_page).unwrap_or(usize::MAX),
            ),
            _ => (self.rows.len(), self.page_count()),
        };

        Some(match self.options.counter {
            PaginationCounter::Pages => format!("Page {} of {}", self.page, last_page.max(1)),
            PaginationCounter::Rows if shown == 0 => format!("Showing 0 of {total} rows"),
            PaginationCounter::Rows => {
                let first = (self.page - 1) * self.effective_page_size(pagination) + 1;
                format!("Showing {}-{} of {} rows", first, first + shown - 1, total)
            }
        })
    }
}

impl GridWidget for DataGrid {
    fn create(init: GridInit) -> Self {
        let mut grid = Self {
            mount: init.mount,
            columns: init.columns,
            rows: init.data,
            page: init.options.initial_page.max(1),
            page_size: init.options.page_size.max(1),
            options: init.options,
            cursor: 0,
            checked: Vec::new(),
        };
        grid.clamp();
        grid
    }

    fn set_data(&mut self, rows: Vec<Record>) {
        self.rows = rows;
        self.clamp();
    }

    fn add_data(&mut self, rows: Vec<Record>) {
        self.rows.extend(rows);
    }

    fn update_data(&mut self, rows: Vec<Record>) {
        for row in rows {
            let Some(id) = row.id() else {
                tracing::debug!("Ignoring grid update for a row without id");
                continue;
            };
            for slot in self.rows.iter_mut().filter(|slot| slot.has_id(&id)) {
                *slot = row.clone();
            }
        }
    }

    fn delete_row(&mut self, id: &RecordId) -> bool {
        let Some(index) = self.rows.iter().position(|row| row.has_id(id)) else {
            return false;
        };
        self.rows.remove(index);
        self.clamp();
        true
    }

    fn set_columns(&mut self, columns: Vec<GridColumn>) {
        self.columns = columns;
    }

    fn rows(&self) -> &[Record] {
        &self.rows
    }

    fn page(&self) -> usize {
        self.page
    }

    fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
        self.cursor = 0;
        self.clamp();
    }

    fn page_size(&self) -> usize {
        self.page_size
    }
}

impl<A> Component<A> for DataGrid {
    type Props<'a> = DataGridProps<'a, A>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = A> {
        if !props.is_focused {
            return None;
        }
        let EventKind::Key(key) = event else {
            return None;
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let last = self.visible_rows().len().saturating_sub(1);
                self.cursor = (self.cursor + 1).min(last);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Char('n') | KeyCode::Right => {
                if self.pages_locally() {
                    if self.page < self.page_count() {
                        self.set_page(self.page + 1);
                    }
                    return None;
                }
                let last = props.pagination.map(|p| p.last_page);
                match last {
                    Some(last) if self.page as u64 >= last => None,
                    _ => Some((props.on_page)(self.page + 1)),
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if self.page <= 1 {
                    return None;
                }
                if self.pages_locally() {
                    self.set_page(self.page - 1);
                    return None;
                }
                Some((props.on_page)(self.page - 1))
            }
            KeyCode::Char('+') => {
                self.step_page_size(true);
                None
            }
            KeyCode::Char('-') => {
                self.step_page_size(false);
                None
            }
            KeyCode::Char(' ') => {
                self.toggle_checked();
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => self.cursor_row().cloned().map(props.on_edit),
            KeyCode::Char('d') | KeyCode::Delete => {
                let ids = if self.checked.is_empty() {
                    self.cursor_row().and_then(Record::id).into_iter().collect()
                } else {
                    self.checked.clone()
                };
                if ids.is_empty() {
                    None
                } else {
                    Some((props.on_delete)(ids))
                }
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", props.title))
            .border_style(if props.is_focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            });
        if let Some(counter) = self.counter(props.pagination) {
            block = block.title_bottom(Line::from(format!(" {counter} ")).right_aligned());
        }

        if props.loading && self.rows.is_empty() {
            let placeholder = Paragraph::new(self.options.placeholder.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let columns: Vec<&GridColumn> = self.columns.iter().filter(|c| c.visible).collect();
        let page_size = self.effective_page_size(props.pagination);
        let cells: Vec<Vec<String>> = self
            .visible_rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cx = CellContext {
                    position: i + 1,
                    page: self.page,
                    page_size,
                    checked: self.is_checked(row),
                };
                columns
                    .iter()
                    .map(|column| cell_text(column, row, &cx))
                    .collect()
            })
            .collect();

        let widths = self.widths(&columns, &cells);
        let header = Row::new(columns.iter().map(|c| Cell::from(c.title.as_str())))
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = cells.into_iter().map(Row::new);

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(if props.is_focused {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::REVERSED)
            });

        let selected = (!self.visible_rows().is_empty()).then_some(self.cursor);
        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }
}
