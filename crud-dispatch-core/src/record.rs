//! Records and record ids

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::StoreError;

/// Identifier of a record, as sent by the backend.
///
/// Equality is tolerant across representations: the number `1` equals the
/// string `"1"`, and `2.0` equals `2`. Backends are not consistent about
/// quoting ids, and rows must still match.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(Number),
    Text(String),
}

impl RecordId {
    /// Read an id out of a JSON value; only numbers and strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(RecordId::Number(n.clone())),
            Value::String(s) => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Number(n) => Value::Number(n.clone()),
            RecordId::Text(s) => Value::String(s.clone()),
        }
    }

    fn numeric(&self) -> Option<f64> {
        match self {
            RecordId::Number(n) => n.as_f64(),
            RecordId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RecordId::Text(a), RecordId::Text(b)) => a == b,
            (RecordId::Number(a), RecordId::Number(b)) if a == b => true,
            _ => match (self.numeric(), other.numeric()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Number(id.into())
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        RecordId::Number(i64::from(id).into())
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Number(id.into())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

/// One row of a resource: an open-ended JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::NotARecord(value_kind(&other))),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// The record's `id`, if it holds a number or string.
    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(RecordId::from_value)
    }

    /// Whether the record's id matches `id` (tolerant equality).
    pub fn has_id(&self, id: &RecordId) -> bool {
        self.id().is_some_and(|own| own == *id)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Text shown for `field` in a table cell.
    ///
    /// Strings render raw, `null`/missing render empty. When `display_key` is
    /// given and the value is an object (a relation), that key of the object
    /// is shown instead; arrays of such objects are joined with `, `.
    pub fn text(&self, field: &str, display_key: Option<&str>) -> String {
        match self.0.get(field) {
            Some(value) => value_text(value, display_key),
            None => String::new(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn value_text(value: &Value, display_key: Option<&str>) -> String {
    match (value, display_key) {
        (Value::Null, _) => String::new(),
        (Value::String(s), _) => s.clone(),
        (Value::Object(obj), Some(key)) => obj
            .get(key)
            .map(|inner| value_text(inner, None))
            .unwrap_or_default(),
        (Value::Array(items), Some(_)) => items
            .iter()
            .map(|item| value_text(item, display_key))
            .collect::<Vec<_>>()
            .join(", "),
        (other, _) => other.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_tolerant_equality() {
        assert_eq!(RecordId::from(1), RecordId::from("1"));
        assert_eq!(RecordId::from("1"), RecordId::from(1));
        assert_eq!(
            RecordId::from_value(&json!(2.0)).unwrap(),
            RecordId::from(2)
        );
        assert_ne!(RecordId::from(1), RecordId::from("2"));
        assert_ne!(RecordId::from("a"), RecordId::from("b"));
        assert_ne!(RecordId::from("abc"), RecordId::from(0));
    }

    #[test]
    fn test_id_equality_is_not_loose_coercion() {
        // Only strings that parse as numbers meet numbers.
        assert_ne!(RecordId::from(""), RecordId::from(0));
        assert_ne!(RecordId::from("  "), RecordId::from(0));
        // Two strings compare exactly.
        assert_ne!(RecordId::from("1"), RecordId::from("1.0"));
        assert_eq!(RecordId::from("1.0"), RecordId::from(1));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(RecordId::from(42).to_string(), "42");
        assert_eq!(RecordId::from("u-1").to_string(), "u-1");
    }

    #[test]
    fn test_record_from_value() {
        let record = Record::from_value(json!({"id": "7", "name": "Ada"})).unwrap();
        assert!(record.has_id(&RecordId::from(7)));
        assert_eq!(record.get("name"), Some(&json!("Ada")));

        assert_eq!(
            Record::from_value(json!([1, 2])),
            Err(StoreError::NotARecord("an array"))
        );
    }

    #[test]
    fn test_record_without_usable_id() {
        let record = Record::new().with("id", json!(null));
        assert_eq!(record.id(), None);
        assert!(!record.has_id(&RecordId::from(0)));
    }

    #[test]
    fn test_cell_text() {
        let record = Record::from_value(json!({
            "name": "Ada",
            "age": 36,
            "note": null,
            "role": {"id": 3, "title": "admin"},
            "tags": [{"id": 1, "title": "a"}, {"id": 2, "title": "b"}]
        }))
        .unwrap();

        assert_eq!(record.text("name", None), "Ada");
        assert_eq!(record.text("age", None), "36");
        assert_eq!(record.text("note", None), "");
        assert_eq!(record.text("missing", None), "");
        assert_eq!(record.text("role", Some("title")), "admin");
        assert_eq!(record.text("tags", Some("title")), "a, b");
    }
}
