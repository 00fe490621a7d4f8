use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use super::errors::{EditorError, EditorResult};

/// Key of the identifier field every row carries.
pub const ID_KEY: &str = "id";

/// One extracted record.
///
/// Rows are schemaless JSON objects whose key order follows the source file.
/// The only guaranteed field is a string `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataRow {
    values: Map<String, Value>,
}

impl DataRow {
    /// Creates an empty row holding only its identifier.
    pub fn new(id: impl Into<String>) -> Self {
        let mut values = Map::new();
        values.insert(ID_KEY.to_string(), Value::String(id.into()));
        Self { values }
    }

    /// Builds a row from one element of a JSON row array.
    ///
    /// Numeric or boolean ids are stored as strings. A missing or null id is
    /// replaced by `gen-<stamp>-<index>`, inserted as the first key.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidRows`] if the value is not an object or
    /// its id is an array or object.
    pub fn from_value(value: Value, index: usize, stamp: u128) -> EditorResult<Self> {
        let mut values = match value {
            Value::Object(map) => map,
            other => {
                return Err(EditorError::InvalidRows(format!(
                    "row {} is not an object (found {})",
                    index,
                    json_kind(&other)
                )));
            }
        };

        match values.get(ID_KEY) {
            Some(Value::String(_)) => {}
            Some(Value::Number(n)) => {
                let id = n.to_string();
                values.insert(ID_KEY.to_string(), Value::String(id));
            }
            Some(Value::Bool(b)) => {
                let id = b.to_string();
                values.insert(ID_KEY.to_string(), Value::String(id));
            }
            Some(Value::Null) | None => {
                let mut with_id = Map::new();
                with_id.insert(ID_KEY.to_string(), Value::String(format!("gen-{stamp}-{index}")));
                for (key, value) in values {
                    if key != ID_KEY {
                        with_id.insert(key, value);
                    }
                }
                values = with_id;
            }
            Some(other) => {
                return Err(EditorError::InvalidRows(format!(
                    "row {} has an unusable id ({})",
                    index,
                    json_kind(other)
                )));
            }
        }

        Ok(Self { values })
    }

    pub fn id(&self) -> &str {
        self.values.get(ID_KEY).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Stores a value. The id field only ever holds strings.
    pub fn set(&mut self, key: &str, value: Value) {
        let value = if key == ID_KEY {
            Value::String(display_value(&value))
        } else {
            value
        };
        self.values.insert(key.to_string(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Text shown in a grid cell.
    pub fn display(&self, key: &str) -> String {
        self.values.get(key).map(display_value).unwrap_or_default()
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Metadata describing how a field is labeled and whether it can be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub key: String,
    pub header: String,
    #[serde(default)]
    pub editable: bool,
}

impl ColumnDefinition {
    pub fn new(key: &str, header: &str, editable: bool) -> Self {
        Self {
            key: key.to_string(),
            header: header.to_string(),
            editable,
        }
    }

    /// Column inferred from a row key: the header is the key itself and only
    /// the id column is read-only.
    pub fn from_key(key: &str) -> Self {
        Self::new(key, key, key != ID_KEY)
    }
}

/// The loaded rows together with the column set used to show them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub rows: Vec<DataRow>,
    pub columns: Vec<ColumnDefinition>,
}

impl Default for Dataset {
    fn default() -> Self {
        let rows = sample_rows()
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| DataRow::from_value(value, index, 0).ok())
            .collect();
        Self {
            rows,
            columns: default_columns(),
        }
    }
}

impl Dataset {
    /// Builds a dataset from rows, deriving columns from the first row.
    ///
    /// An empty row set keeps `fallback_columns`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::DuplicateId`] if two rows share an id.
    pub fn from_rows(rows: Vec<DataRow>, fallback_columns: &[ColumnDefinition]) -> EditorResult<Self> {
        let mut seen = HashSet::new();
        for row in &rows {
            if !seen.insert(row.id()) {
                return Err(EditorError::DuplicateId(row.id().to_string()));
            }
        }

        let columns = columns_from_first_row(&rows).unwrap_or_else(|| fallback_columns.to_vec());
        Ok(Self { rows, columns })
    }

    /// Builds a dataset from a parsed JSON row array.
    pub fn from_json_values(values: Vec<Value>, fallback_columns: &[ColumnDefinition]) -> EditorResult<Self> {
        let stamp = unix_millis();
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| DataRow::from_value(value, index, stamp))
            .collect::<EditorResult<Vec<_>>>()?;
        Self::from_rows(rows, fallback_columns)
    }

    pub fn row_index(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|col| col.key == key)
    }

    /// Column keys offered to the mapping service; the id never is.
    pub fn mappable_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|col| col.key != ID_KEY)
            .map(|col| col.key.clone())
            .collect()
    }
}

/// Columns inferred from the keys of the first row, in key order.
pub fn columns_from_first_row(rows: &[DataRow]) -> Option<Vec<ColumnDefinition>> {
    rows.first()
        .map(|row| row.keys().map(ColumnDefinition::from_key).collect())
}

pub fn default_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("fieldName", "Field Name", true),
        ColumnDefinition::new("fieldValue", "Value", true),
        ColumnDefinition::new("category", "Category", true),
        ColumnDefinition::new("notes", "Notes", true),
    ]
}

fn sample_rows() -> Vec<Value> {
    vec![
        json!({ "id": "1", "fieldName": "Invoice Number", "fieldValue": "INV-2024-001", "category": "Metadata", "notes": "Auto-generated" }),
        json!({ "id": "2", "fieldName": "Client Name", "fieldValue": "Stellar Solutions Inc.", "category": "Client Details", "notes": "" }),
        json!({ "id": "3", "fieldName": "Issue Date", "fieldValue": "2024-07-26", "category": "Dates", "notes": "Payment due in 30 days" }),
        json!({ "id": "4", "fieldName": "Total Amount", "fieldValue": "$2,500.00", "category": "Financials", "notes": "Includes 10% discount" }),
        json!({ "id": "5", "fieldName": "Service Rendered", "fieldValue": "Web Development", "category": "Line Items", "notes": "Homepage redesign" }),
    ]
}

/// Renders a value the way a grid cell shows it.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        other => scalar_text(other),
    }
}

pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dataset_matches_default_columns() {
        let dataset = Dataset::default();
        assert_eq!(dataset.rows.len(), 5);
        assert_eq!(dataset.columns.len(), 4);
        assert_eq!(dataset.rows[0].id(), "1");
        assert_eq!(dataset.rows[3].display("fieldValue"), "$2,500.00");
    }

    #[test]
    fn test_columns_follow_first_row_keys() {
        let values = vec![
            json!({ "id": "a", "pos": "P1", "name": "ITP", "quantity": "1" }),
            json!({ "id": "b", "pos": "P2", "extra": true }),
            json!({ "id": "c" }),
        ];
        let dataset = Dataset::from_json_values(values, &default_columns()).unwrap();

        let keys: Vec<&str> = dataset.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "pos", "name", "quantity"]);
        assert_eq!(dataset.rows.len(), 3);
        assert!(!dataset.column("id").unwrap().editable);
        assert!(dataset.column("pos").unwrap().editable);
        assert_eq!(dataset.column("name").unwrap().header, "name");
    }

    #[test]
    fn test_missing_id_is_generated_first() {
        let row = DataRow::from_value(json!({ "name": "ITP", "size": "" }), 3, 1700).unwrap();
        assert_eq!(row.id(), "gen-1700-3");
        assert_eq!(row.keys().next(), Some("id"));
        assert_eq!(row.keys().count(), 3);
    }

    #[test]
    fn test_numeric_id_becomes_string() {
        let row = DataRow::from_value(json!({ "id": 42, "name": "x" }), 0, 0).unwrap();
        assert_eq!(row.id(), "42");
        assert_eq!(row.get("id"), Some(&json!("42")));
    }

    #[test]
    fn test_non_object_row_is_rejected() {
        let result = DataRow::from_value(json!("just text"), 2, 0);
        assert!(matches!(result, Err(EditorError::InvalidRows(_))));

        let result = DataRow::from_value(json!({ "id": [1, 2] }), 0, 0);
        assert!(matches!(result, Err(EditorError::InvalidRows(_))));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let values = vec![json!({ "id": "1" }), json!({ "id": 1 })];
        let result = Dataset::from_json_values(values, &default_columns());
        assert!(matches!(result, Err(EditorError::DuplicateId(id)) if id == "1"));
    }

    #[test]
    fn test_empty_rows_keep_fallback_columns() {
        let dataset = Dataset::from_json_values(Vec::new(), &default_columns()).unwrap();
        assert!(dataset.rows.is_empty());
        assert_eq!(dataset.columns, default_columns());
    }

    #[test]
    fn test_display_values() {
        let row = DataRow::from_value(
            json!({
                "id": "1",
                "pages": [1, 2],
                "artikuls": ["A-1", "B-2"],
                "check": true,
                "weight": null,
                "qty": 3.5
            }),
            0,
            0,
        )
        .unwrap();

        assert_eq!(row.display("pages"), "1, 2");
        assert_eq!(row.display("artikuls"), "A-1, B-2");
        assert_eq!(row.display("check"), "true");
        assert_eq!(row.display("weight"), "");
        assert_eq!(row.display("qty"), "3.5");
        assert_eq!(row.display("missing"), "");
    }

    #[test]
    fn test_mappable_columns_skip_id() {
        let values = vec![json!({ "id": "1", "name": "n", "code": "c" })];
        let dataset = Dataset::from_json_values(values, &[]).unwrap();
        assert_eq!(dataset.mappable_columns(), vec!["name".to_string(), "code".to_string()]);
    }
}
