//! Field schema: the ordered description of displayable/editable columns
//!
//! A schema is a list of descriptors, each either a plain column or a group
//! wrapping further columns. Groups nest exactly one level deep and only
//! matter for form layout; tables and payloads work on the flattened list.
//!
//! ```
//! use crud_dispatch_core::schema::FieldSchema;
//!
//! let schema: FieldSchema = serde_json::from_str(r#"[
//!     {"field": "name", "title": "Name"},
//!     {"groupLabel": "Contact", "items": [
//!         {"field": "email", "title": "Email"},
//!         {"field": "phone", "title": "Phone"}
//!     ]}
//! ]"#).unwrap();
//!
//! let fields: Vec<_> = schema.flat_fields().map(|c| c.field.as_str()).collect();
//! assert_eq!(fields, ["name", "email", "phone"]);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::Record;

fn default_relation_key() -> String {
    "id".to_string()
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Link from a column to another model.
///
/// Relation values arrive as objects (or arrays of objects) and are sent
/// back as their `key` field only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub model: String,
    /// Field of the related object that is sent to the backend.
    #[serde(default = "default_relation_key")]
    pub key: String,
    /// Payload name to send the flattened value under; defaults to the column's field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_as: Option<String>,
    /// Field of the related object shown in table cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Relation {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            key: default_relation_key(),
            send_as: None,
            label: None,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn send_as(mut self, name: impl Into<String>) -> Self {
        self.send_as = Some(name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn flatten(&self, value: Value) -> Value {
        match value {
            Value::Object(obj) => obj.get(&self.key).cloned().unwrap_or(Value::Null),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(obj) => obj.get(&self.key).cloned().unwrap_or(Value::Null),
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}

/// A single column definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    pub field: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<Relation>,
    /// Shown but never sent to the backend.
    #[serde(default, skip_serializing_if = "is_false")]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
    /// Any other keys, passed through to the column configuration.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnDef {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            relation: None,
            readonly: false,
            hidden: false,
            extra: Map::new(),
        }
    }

    pub fn relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Table column configuration for this field.
    pub fn column(&self) -> ColumnConfig {
        ColumnConfig {
            title: if self.title.is_empty() {
                self.field.clone()
            } else {
                self.title.clone()
            },
            field: self.field.clone(),
            visible: !self.hidden,
            display_key: self.relation.as_ref().and_then(|r| r.label.clone()),
            extra: self.extra.clone(),
        }
    }
}

/// A labelled group of columns (one level deep).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldGroup {
    pub group_label: String,
    pub items: Vec<ColumnDef>,
}

/// One entry of a [`FieldSchema`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldDescriptor {
    // Tried first: a group is recognized by its `groupLabel`.
    Group(FieldGroup),
    Column(ColumnDef),
}

impl From<ColumnDef> for FieldDescriptor {
    fn from(column: ColumnDef) -> Self {
        FieldDescriptor::Column(column)
    }
}

impl From<FieldGroup> for FieldDescriptor {
    fn from(group: FieldGroup) -> Self {
        FieldDescriptor::Group(group)
    }
}

/// Ordered field descriptors for one screen.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema(Vec<FieldDescriptor>);

impl FieldSchema {
    pub fn new(descriptors: Vec<FieldDescriptor>) -> Self {
        Self(descriptors)
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.0.push(FieldDescriptor::Column(column));
        self
    }

    pub fn group(mut self, label: impl Into<String>, items: Vec<ColumnDef>) -> Self {
        self.0.push(FieldDescriptor::Group(FieldGroup {
            group_label: label.into(),
            items,
        }));
        self
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Columns with groups expanded in place, order preserved.
    pub fn flat_fields(&self) -> impl Iterator<Item = &ColumnDef> {
        self.0.iter().flat_map(|descriptor| match descriptor {
            FieldDescriptor::Group(group) => group.items.iter(),
            FieldDescriptor::Column(column) => std::slice::from_ref(column).iter(),
        })
    }

    /// Table column configuration derived from the flat field list.
    pub fn columns(&self) -> Vec<ColumnConfig> {
        self.flat_fields().map(ColumnDef::column).collect()
    }

    /// Backend payload for `data`.
    ///
    /// Relation fields are flattened to their key (and renamed when the
    /// relation says so), readonly fields are dropped, everything else
    /// passes through untouched.
    pub fn to_send_form(&self, data: &Record) -> Record {
        let mut form = data.clone();
        for column in self.flat_fields() {
            if column.readonly {
                form.remove(&column.field);
                continue;
            }
            let Some(relation) = &column.relation else {
                continue;
            };
            let Some(value) = form.remove(&column.field) else {
                continue;
            };
            let name = relation
                .send_as
                .clone()
                .unwrap_or_else(|| column.field.clone());
            form.insert(name, relation.flatten(value));
        }
        form
    }
}

impl FromIterator<FieldDescriptor> for FieldSchema {
    fn from_iter<I: IntoIterator<Item = FieldDescriptor>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Column configuration consumed by a grid widget.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub title: String,
    pub field: String,
    pub visible: bool,
    /// Key shown for object-valued cells (relations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ColumnConfig {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            field: field.into(),
            visible: true,
            display_key: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> FieldSchema {
        FieldSchema::default()
            .column(ColumnDef::new("id", "#").readonly())
            .group(
                "Profile",
                vec![
                    ColumnDef::new("first_name", "First"),
                    ColumnDef::new("last_name", "Last"),
                    ColumnDef::new("role", "Role")
                        .relation(Relation::new("roles").send_as("role_id").label("title")),
                ],
            )
            .column(ColumnDef::new("email", "Email"))
    }

    #[test]
    fn test_flatten_preserves_order() {
        let schema = sample_schema();
        let fields: Vec<_> = schema.flat_fields().map(|c| c.field.as_str()).collect();
        assert_eq!(
            fields,
            ["id", "first_name", "last_name", "role", "email"]
        );
    }

    #[test]
    fn test_deserialize_groups_and_columns() {
        let schema: FieldSchema = serde_json::from_value(json!([
            {"field": "name", "title": "Name", "width": 120},
            {"groupLabel": "Address", "items": [
                {"field": "city"},
                {"field": "zip", "hidden": true}
            ]}
        ]))
        .unwrap();

        assert_eq!(schema.descriptors().len(), 2);
        assert!(matches!(schema.descriptors()[1], FieldDescriptor::Group(_)));

        let columns = schema.columns();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].extra.get("width"), Some(&json!(120)));
        assert_eq!(columns[1].title, "city");
        assert!(!columns[2].visible);
    }

    #[test]
    fn test_column_display_key_from_relation() {
        let columns = sample_schema().columns();
        assert_eq!(columns[3].display_key.as_deref(), Some("title"));
        assert_eq!(columns[1].display_key, None);
    }

    #[test]
    fn test_send_form_flattens_relations() {
        let data = Record::from_value(json!({
            "id": 5,
            "first_name": "Ada",
            "role": {"id": 3, "title": "admin"},
            "unlisted": true
        }))
        .unwrap();

        let form = sample_schema().to_send_form(&data);

        assert_eq!(form.get("id"), None);
        assert_eq!(form.get("role"), None);
        assert_eq!(form.get("role_id"), Some(&json!(3)));
        assert_eq!(form.get("first_name"), Some(&json!("Ada")));
        assert_eq!(form.get("unlisted"), Some(&json!(true)));
    }

    #[test]
    fn test_send_form_flattens_relation_arrays() {
        let schema = FieldSchema::default()
            .column(ColumnDef::new("tags", "Tags").relation(Relation::new("tags")));
        let data = Record::from_value(json!({"tags": [{"id": 1}, {"id": 2}, 9]})).unwrap();

        let form = schema.to_send_form(&data);
        assert_eq!(form.get("tags"), Some(&json!([1, 2, 9])));
    }
}
