//! Row editing operations for the data grid.
//!
//! Cells are addressed by row id and column key, never by position, so edits
//! stay attached to the right record when rows are added or removed.

use serde_json::Value;

use super::models::{scalar_text, unix_millis, DataRow, Dataset, ID_KEY};

impl Dataset {
    /// Text a grid cell shows; empty for unknown rows or keys.
    pub fn cell_display(&self, row_id: &str, key: &str) -> String {
        self.row_index(row_id)
            .map(|index| self.rows[index].display(key))
            .unwrap_or_default()
    }

    /// Text placed into the cell editor when editing starts.
    ///
    /// Arrays are joined with "," so that saving the text unchanged yields
    /// the same items back.
    pub fn edit_text(&self, row_id: &str, key: &str) -> String {
        let Some(index) = self.row_index(row_id) else {
            return String::new();
        };
        match self.rows[index].get(key) {
            Some(Value::Array(items)) => items.iter().map(scalar_text).collect::<Vec<_>>().join(","),
            Some(value) => scalar_text(value),
            None => String::new(),
        }
    }

    /// Stores edited text into a cell, keeping booleans and arrays typed.
    ///
    /// Returns `false` if no row has the given id.
    pub fn set_cell_text(&mut self, row_id: &str, key: &str, input: &str) -> bool {
        let Some(index) = self.row_index(row_id) else {
            return false;
        };
        let row = &mut self.rows[index];
        let value = coerce_edit(row.get(key), input);
        row.set(key, value);
        true
    }

    /// Appends a blank row and returns its id.
    ///
    /// The id is the current Unix time in milliseconds, suffixed when that
    /// id is already taken.
    pub fn add_row(&mut self) -> String {
        let base = unix_millis().to_string();
        let mut id = base.clone();
        let mut suffix = 1;
        while self.row_index(&id).is_some() {
            id = format!("{base}-{suffix}");
            suffix += 1;
        }

        let mut row = DataRow::new(id.clone());
        for column in &self.columns {
            if column.key != ID_KEY {
                row.set(&column.key, Value::String(String::new()));
            }
        }
        self.rows.push(row);
        id
    }

    pub fn delete_row(&mut self, row_id: &str) -> Option<DataRow> {
        let index = self.row_index(row_id)?;
        Some(self.rows.remove(index))
    }
}

/// Converts editor input into a value shaped like the previous one.
pub fn coerce_edit(previous: Option<&Value>, input: &str) -> Value {
    match previous {
        Some(Value::Bool(_)) => match input.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(input.to_string()),
        },
        Some(Value::Array(_)) => Value::Array(
            input
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ),
        _ => Value::String(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::default_columns;
    use serde_json::json;

    fn extracted() -> Dataset {
        let values = vec![
            json!({ "id": "gen-1", "name": "ITP", "manual_check_needed": true, "potential_artikuls": ["A", "B"], "quantity": 1 }),
            json!({ "id": "gen-2", "name": "Guard room", "manual_check_needed": false, "potential_artikuls": [], "quantity": 2 }),
        ];
        Dataset::from_json_values(values, &default_columns()).unwrap()
    }

    #[test]
    fn test_cell_display() {
        let dataset = extracted();
        assert_eq!(dataset.cell_display("gen-1", "potential_artikuls"), "A, B");
        assert_eq!(dataset.cell_display("gen-2", "manual_check_needed"), "false");
        assert_eq!(dataset.cell_display("gen-2", "notes"), "");
        assert_eq!(dataset.cell_display("gen-9", "name"), "");
    }

    #[test]
    fn test_edit_text_uses_comma_for_arrays() {
        let dataset = extracted();
        assert_eq!(dataset.edit_text("gen-1", "potential_artikuls"), "A,B");
        assert_eq!(dataset.edit_text("gen-1", "quantity"), "1");
        assert_eq!(dataset.edit_text("missing", "name"), "");
    }

    #[test]
    fn test_set_cell_text_is_addressed_by_id() {
        let mut dataset = extracted();
        assert!(dataset.set_cell_text("gen-2", "name", "Security room"));
        assert_eq!(dataset.rows[1].display("name"), "Security room");
        assert_eq!(dataset.rows[0].display("name"), "ITP");
        assert!(!dataset.set_cell_text("gen-9", "name", "nobody"));
    }

    #[test]
    fn test_set_cell_text_keeps_types() {
        let mut dataset = extracted();
        dataset.set_cell_text("gen-1", "manual_check_needed", "false");
        assert_eq!(dataset.rows[0].get("manual_check_needed"), Some(&json!(false)));

        dataset.set_cell_text("gen-1", "potential_artikuls", "X-1, Y-2,");
        assert_eq!(dataset.rows[0].get("potential_artikuls"), Some(&json!(["X-1", "Y-2"])));

        dataset.set_cell_text("gen-1", "quantity", "12");
        assert_eq!(dataset.rows[0].get("quantity"), Some(&json!("12")));
    }

    #[test]
    fn test_coerce_edit_falls_back_to_string() {
        assert_eq!(coerce_edit(Some(&json!(true)), "maybe"), json!("maybe"));
        assert_eq!(coerce_edit(Some(&json!([1])), ""), json!([]));
        assert_eq!(coerce_edit(None, "new"), json!("new"));
    }

    #[test]
    fn test_add_row_fills_every_column() {
        let mut dataset = extracted();
        let id = dataset.add_row();

        let row = &dataset.rows[dataset.row_index(&id).unwrap()];
        assert_eq!(row.id(), id);
        assert_eq!(row.get("name"), Some(&json!("")));
        assert_eq!(row.get("potential_artikuls"), Some(&json!("")));
        assert_eq!(dataset.rows.len(), 3);
    }

    #[test]
    fn test_add_row_ids_stay_unique() {
        let mut dataset = Dataset::default();
        let first = dataset.add_row();
        let second = dataset.add_row();
        let third = dataset.add_row();
        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);
    }

    #[test]
    fn test_delete_row() {
        let mut dataset = extracted();
        let removed = dataset.delete_row("gen-1").unwrap();
        assert_eq!(removed.display("name"), "ITP");
        assert_eq!(dataset.rows.len(), 1);
        assert!(dataset.delete_row("gen-1").is_none());
    }
}
