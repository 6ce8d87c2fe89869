//! Grid columns and cell renderers

use crud_dispatch_core::{ColumnConfig, Record};
use serde_json::{Map, Value};

/// Field name of the row-selection checkbox column.
pub const SELECT_FIELD: &str = "_select_";
/// Field name of the row action-button column.
pub const ACTIONS_FIELD: &str = "_actions_";
/// Field name of the computed row-number column.
pub const INDEX_FIELD: &str = "_index_";

/// How a column's cells are drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellRenderer {
    /// The record's value for the field; `display_key` picks the shown key
    /// of object values.
    Plain { display_key: Option<String> },
    SelectCheckbox,
    ActionButtons,
    /// Row number across pages, see [`row_index`].
    RowIndex,
}

/// A column as the grid draws it.
#[derive(Clone, Debug, PartialEq)]
pub struct GridColumn {
    pub field: String,
    pub title: String,
    pub visible: bool,
    pub renderer: CellRenderer,
    /// Fixed width in cells, from the column's `width` key.
    pub width: Option<u16>,
    pub extra: Map<String, Value>,
}

impl GridColumn {
    pub fn plain(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            visible: true,
            renderer: CellRenderer::Plain { display_key: None },
            width: None,
            extra: Map::new(),
        }
    }
}

impl From<&ColumnConfig> for GridColumn {
    fn from(config: &ColumnConfig) -> Self {
        let renderer = match config.field.as_str() {
            SELECT_FIELD => CellRenderer::SelectCheckbox,
            ACTIONS_FIELD => CellRenderer::ActionButtons,
            INDEX_FIELD => CellRenderer::RowIndex,
            _ => CellRenderer::Plain {
                display_key: config.display_key.clone(),
            },
        };
        let width = config
            .extra
            .get("width")
            .and_then(Value::as_u64)
            .and_then(|w| u16::try_from(w).ok());

        Self {
            field: config.field.clone(),
            title: config.title.clone(),
            visible: config.visible,
            renderer,
            width,
            extra: config.extra.clone(),
        }
    }
}

/// Map column configurations to grid columns.
///
/// `_select_`, `_actions_` and `_index_` get their special renderers;
/// everything else passes through unchanged.
pub fn apply_columns(columns: &[ColumnConfig]) -> Vec<GridColumn> {
    columns.iter().map(GridColumn::from).collect()
}

/// Row number of the row at 1-based `position` within the shown page.
pub fn row_index(position: usize, page: usize, page_size: usize) -> usize {
    position + page.saturating_sub(1) * page_size
}

/// Where a row sits, for renderers that need it.
pub struct CellContext {
    /// 1-based position within the shown page.
    pub position: usize,
    pub page: usize,
    pub page_size: usize,
    pub checked: bool,
}

/// What a cell of `column` shows for `record`.
pub fn cell_text(column: &GridColumn, record: &Record, cx: &CellContext) -> String {
    match &column.renderer {
        CellRenderer::Plain { display_key } => record.text(&column.field, display_key.as_deref()),
        CellRenderer::SelectCheckbox => {
            let mark = if cx.checked { "[x]" } else { "[ ]" };
            mark.to_string()
        }
        CellRenderer::ActionButtons => "[e]dit [d]el".to_string(),
        CellRenderer::RowIndex => row_index(cx.position, cx.page, cx.page_size).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cx(position: usize) -> CellContext {
        CellContext {
            position,
            page: 3,
            page_size: 5,
            checked: false,
        }
    }

    #[test]
    fn test_apply_columns_special_fields() {
        let mut name = ColumnConfig::new("name", "Name");
        name.extra.insert("width".into(), json!(12));
        let columns = apply_columns(&[
            ColumnConfig::new(SELECT_FIELD, ""),
            ColumnConfig::new(INDEX_FIELD, "#"),
            name,
            ColumnConfig::new(ACTIONS_FIELD, "Actions"),
        ]);

        let renderers: Vec<_> = columns.iter().map(|c| c.renderer.clone()).collect();
        assert_eq!(
            renderers,
            vec![
                CellRenderer::SelectCheckbox,
                CellRenderer::RowIndex,
                CellRenderer::Plain { display_key: None },
                CellRenderer::ActionButtons,
            ]
        );
        assert_eq!(columns[2].width, Some(12));
        assert_eq!(columns[2].extra.get("width"), Some(&json!(12)));
    }

    #[test]
    fn test_plain_columns_pass_through() {
        let mut config = ColumnConfig::new("owner", "Owner");
        config.display_key = Some("name".into());
        config.visible = false;

        let column = GridColumn::from(&config);

        assert_eq!(column.field, "owner");
        assert_eq!(column.title, "Owner");
        assert!(!column.visible);
        assert_eq!(
            column.renderer,
            CellRenderer::Plain {
                display_key: Some("name".into())
            }
        );
    }

    #[test]
    fn test_row_index_accounts_for_page() {
        assert_eq!(row_index(1, 1, 5), 1);
        assert_eq!(row_index(2, 3, 5), 12);
        assert_eq!(row_index(4, 0, 10), 4);
    }

    #[test]
    fn test_cell_text() {
        let record = Record::from_value(json!({"id": 1, "owner": {"name": "Ada"}})).unwrap();
        let owner = GridColumn {
            renderer: CellRenderer::Plain {
                display_key: Some("name".into()),
            },
            ..GridColumn::plain("owner", "Owner")
        };
        let index = GridColumn {
            renderer: CellRenderer::RowIndex,
            ..GridColumn::plain(INDEX_FIELD, "#")
        };

        assert_eq!(cell_text(&owner, &record, &cx(1)), "Ada");
        assert_eq!(cell_text(&index, &record, &cx(2)), "12");
    }
}
