//! Application state and UI glue for the table demo

use crossterm::event::{KeyCode, KeyModifiers};
use crud_dispatch::grid::{
    centered_rect, render_modal, ConfirmDialog, ConfirmDialogProps, ModalStyle, ACTIONS_FIELD,
    INDEX_FIELD, SELECT_FIELD,
};
use crud_dispatch::{
    AlertColor, ColumnConfig, ColumnDef, Component, DataGrid, DataGridProps, DeleteRequest,
    DynamicStore, EventKind, FieldSchema, GridOptions, Notification, Record, RecordId,
    ResourceKey, StoreAction, StoreError, TableAdapter, TableError,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use thiserror::Error;

/// What a key press asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Show the record in the detail view
    Edit(Record),
    /// Ask before deleting these rows
    Delete(Vec<RecordId>),
    DeleteConfirm,
    DeleteCancel,
    DetailClose,
    /// Load a server page
    Page(usize),
    /// Reload the current page
    Refresh,
    Quit,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Table(#[from] TableError),
}

pub struct App {
    store: DynamicStore,
    table: TableAdapter<DataGrid>,
    dialog: ConfirmDialog,
    key: ResourceKey,
    title: String,
    status: Option<(String, AlertColor)>,
    pending_delete: Option<Vec<RecordId>>,
    detail: Option<Record>,
    should_quit: bool,
}

impl App {
    /// Register `route` as the store's main resource and build the table.
    pub fn new(
        mut store: DynamicStore,
        route: &str,
        fields: FieldSchema,
        options: GridOptions,
        mount: Rect,
    ) -> Result<Self, AppError> {
        store.register_route(route)?;
        store.set_fields(fields);
        let key = store.state().require_main()?.clone();

        let mut table = TableAdapter::<DataGrid>::new();
        table.initialize(
            mount,
            &grid_columns(store.state().columns()),
            store.state().items(&key).to_vec(),
            options,
        );

        Ok(Self {
            title: key.to_string(),
            store,
            table,
            dialog: ConfirmDialog,
            key,
            status: None,
            pending_delete: None,
            detail: None,
            should_quit: false,
        })
    }

    pub fn store(&self) -> &DynamicStore {
        &self.store
    }

    pub fn table(&self) -> &TableAdapter<DataGrid> {
        &self.table
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Text of the last alert.
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn pending_delete(&self) -> Option<&[RecordId]> {
        self.pending_delete.as_deref()
    }

    pub fn detail(&self) -> Option<&Record> {
        self.detail.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Load the first page.
    pub fn start(&mut self) -> Result<(), AppError> {
        self.store.paginate(1)?;
        Ok(())
    }

    pub fn handle_event(&mut self, event: &EventKind) -> Vec<UiAction> {
        if let Some(ids) = &self.pending_delete {
            let message = delete_message(ids.len());
            let props = ConfirmDialogProps {
                title: "Delete",
                message: &message,
                on_confirm: UiAction::DeleteConfirm,
                on_cancel: UiAction::DeleteCancel,
            };
            return self.dialog.handle_event(event, props).into_iter().collect();
        }

        let EventKind::Key(key) = event else {
            return Vec::new();
        };
        if self.detail.is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => vec![UiAction::DetailClose],
                _ => Vec::new(),
            };
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return vec![UiAction::Quit]
            }
            KeyCode::Char('q') | KeyCode::Esc => return vec![UiAction::Quit],
            KeyCode::Char('r') => return vec![UiAction::Refresh],
            _ => {}
        }

        let state = self.store.state();
        let Ok(grid) = self.table.grid_mut() else {
            return Vec::new();
        };
        let props = DataGridProps {
            title: &self.title,
            is_focused: true,
            loading: state.is_main_loading(),
            pagination: state.pagination(&self.key),
            on_edit: UiAction::Edit,
            on_delete: UiAction::Delete,
            on_page: UiAction::Page,
        };
        grid.handle_event(event, props).into_iter().collect()
    }

    pub fn update(&mut self, action: UiAction) -> Result<(), AppError> {
        match action {
            UiAction::Edit(record) => self.detail = Some(record),
            UiAction::DetailClose => self.detail = None,
            UiAction::Delete(ids) => self.pending_delete = Some(ids),
            UiAction::DeleteConfirm => {
                // The dialog stays up until the store reports the delete.
                if self.store.state().is_main_loading() {
                    tracing::debug!("Ignoring delete confirmation while a request runs");
                    return Ok(());
                }
                if let Some(ids) = self.pending_delete.clone() {
                    self.store
                        .delete_records(&self.key, DeleteRequest::many(ids))?;
                }
            }
            UiAction::DeleteCancel => self.pending_delete = None,
            UiAction::Page(page) => {
                self.store.paginate(u32::try_from(page).unwrap_or(u32::MAX))?;
            }
            UiAction::Refresh => {
                let page = self
                    .store
                    .state()
                    .pagination(&self.key)
                    .map_or(1, |p| p.current_page);
                self.store
                    .list_resources(&self.key, u32::try_from(page).unwrap_or(1))?;
            }
            UiAction::Quit => self.should_quit = true,
        }
        Ok(())
    }

    /// Wait for the next store result. See [`DynamicStore::process_next`].
    pub async fn next_result(&mut self) -> Option<StoreAction> {
        self.store.process_next().await
    }

    /// Mirror an applied store result into the table.
    pub fn apply(&mut self, action: &StoreAction) -> Result<(), AppError> {
        self.table.mirror(&self.key, action)?;
        Ok(())
    }

    /// Apply results until nothing is in flight.
    pub async fn settle(&mut self) -> Result<(), AppError> {
        while let Some(action) = self.store.process_next().await {
            self.apply(&action)?;
        }
        Ok(())
    }

    pub fn notify(&mut self, notification: Notification) {
        tracing::debug!(event = notification.event_name(), "Notification");
        match notification {
            Notification::Alert { text, color } => self.status = Some((text, color)),
            Notification::DialogForm(false) => self.detail = None,
            Notification::DeleteDialog(false) => self.pending_delete = None,
            Notification::DialogForm(true) | Notification::DeleteDialog(true) => {}
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let [body, status, help] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let state = self.store.state();
        if let Ok(grid) = self.table.grid_mut() {
            let props = DataGridProps {
                title: &self.title,
                is_focused: self.pending_delete.is_none() && self.detail.is_none(),
                loading: state.is_main_loading(),
                pagination: state.pagination(&self.key),
                on_edit: UiAction::Edit,
                on_delete: UiAction::Delete,
                on_page: UiAction::Page,
            };
            grid.render(frame, body, props);
        }

        if let Some((text, color)) = &self.status {
            let fg = match color {
                AlertColor::Green => Color::Green,
                AlertColor::Red => Color::Red,
            };
            frame.render_widget(
                Paragraph::new(Line::styled(text.as_str(), Style::default().fg(fg))),
                status,
            );
        }
        frame.render_widget(
            Paragraph::new(Line::styled(
                "j/k move  n/p page  space select  e view  d delete  r reload  q quit",
                Style::default().fg(Color::DarkGray),
            )),
            help,
        );

        let full = frame.area();
        if let Some(record) = &self.detail {
            render_detail(frame, full, record);
        }
        if let Some(ids) = &self.pending_delete {
            let message = delete_message(ids.len());
            let props = ConfirmDialogProps {
                title: "Delete",
                message: &message,
                on_confirm: UiAction::DeleteConfirm,
                on_cancel: UiAction::DeleteCancel,
            };
            self.dialog.render(frame, full, props);
        }
    }
}

fn render_detail(frame: &mut Frame, area: Rect, record: &Record) {
    let height = u16::try_from(record.fields().len())
        .unwrap_or(u16::MAX)
        .saturating_add(2);
    let dialog = centered_rect(60, height, area);
    render_modal(frame, dialog, &ModalStyle::with_bg(Color::Black));

    let label = Style::default().add_modifier(Modifier::BOLD);
    let lines: Vec<Line> = record
        .fields()
        .keys()
        .map(|field| {
            Line::from(vec![
                Span::styled(format!("{field}: "), label),
                Span::raw(record.text(field, None)),
            ])
        })
        .collect();
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Record ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(paragraph, dialog);
}

fn delete_message(count: usize) -> String {
    match count {
        1 => "Delete the selected row?".to_string(),
        n => format!("Delete {n} rows?"),
    }
}

/// Surround schema columns with the selection, row number and action columns.
pub fn grid_columns(columns: Vec<ColumnConfig>) -> Vec<ColumnConfig> {
    let mut all = vec![
        ColumnConfig::new(SELECT_FIELD, ""),
        ColumnConfig::new(INDEX_FIELD, "#"),
    ];
    all.extend(columns);
    all.push(ColumnConfig::new(ACTIONS_FIELD, "Actions"));
    all
}

/// Schema with one column per comma-separated field name.
pub fn schema_from_list(list: &str) -> FieldSchema {
    list.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .fold(FieldSchema::default(), |schema, field| {
            schema.column(ColumnDef::new(field, title_case(field)))
        })
}

fn title_case(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_list() {
        let schema = schema_from_list("id, first_name,,email");
        let titles: Vec<_> = schema.flat_fields().map(|c| c.title.clone()).collect();

        assert_eq!(titles, vec!["Id", "First Name", "Email"]);
    }

    #[test]
    fn test_grid_columns_wrap_schema() {
        let columns = grid_columns(vec![ColumnConfig::new("name", "Name")]);
        let fields: Vec<_> = columns.iter().map(|c| c.field.as_str()).collect();

        assert_eq!(fields, vec![SELECT_FIELD, INDEX_FIELD, "name", ACTIONS_FIELD]);
    }

    #[test]
    fn test_delete_message() {
        assert_eq!(delete_message(1), "Delete the selected row?");
        assert_eq!(delete_message(3), "Delete 3 rows?");
    }
}
