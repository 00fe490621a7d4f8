//! JSON and CSV conversion of the row set.

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde_json::{Map, Value};

use super::errors::{EditorError, EditorResult};
use super::models::{scalar_text, unix_millis, ColumnDefinition, DataRow, Dataset, ID_KEY};

/// Separator used when an array value is flattened into one CSV field.
pub const CSV_ARRAY_SEPARATOR: &str = ";";

pub struct CsvExporter;

impl CsvExporter {
    /// Pretty-printed JSON array of the rows, as loaded plus edits.
    pub fn to_json(rows: &[DataRow]) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(rows)?)
    }

    /// CSV text with one header line from the column headers and one line
    /// per row.
    ///
    /// Every data field is double-quoted with embedded quotes doubled. Array
    /// values are joined with [`CSV_ARRAY_SEPARATOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfgrid::domain::{ColumnDefinition, CsvExporter, DataRow};
    ///
    /// let mut row = DataRow::new("1");
    /// row.set("name", serde_json::json!("Fan \"FRC\""));
    /// let columns = vec![ColumnDefinition::new("name", "Name", true)];
    ///
    /// let csv = CsvExporter::to_csv(&[row], &columns).unwrap();
    /// assert_eq!(csv, "Name\n\"Fan \"\"FRC\"\"\"\n");
    /// ```
    pub fn to_csv(rows: &[DataRow], columns: &[ColumnDefinition]) -> EditorResult<String> {
        let mut header = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        header.write_record(columns.iter().map(|col| col.header.as_str()))?;

        let mut body = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(header.into_inner().map_err(|e| EditorError::Io(e.into_error()))?);
        for row in rows {
            body.write_record(columns.iter().map(|col| csv_field(row.get(&col.key))))?;
        }

        let bytes = body.into_inner().map_err(|e| EditorError::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| EditorError::InvalidRows(e.to_string()))
    }

    /// Parses CSV text into a dataset.
    ///
    /// Header names become column keys. An `id` column supplies row ids;
    /// rows without one get generated ids. Every value loads as a string.
    pub fn from_csv(text: &str) -> EditorResult<Dataset> {
        let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();
        let stamp = unix_millis();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let mut values = Map::new();
            for (key, field) in headers.iter().zip(record.iter()) {
                if key == ID_KEY && field.is_empty() {
                    continue;
                }
                values.insert(key.to_string(), Value::String(field.to_string()));
            }
            rows.push(DataRow::from_value(Value::Object(values), index, stamp)?);
        }

        let header_columns: Vec<ColumnDefinition> =
            headers.iter().map(ColumnDefinition::from_key).collect();
        Dataset::from_rows(rows, &header_columns)
    }
}

fn csv_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(CSV_ARRAY_SEPARATOR),
        Some(value) => scalar_text(value),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::default_columns;
    use serde_json::json;

    fn extracted() -> Dataset {
        let values = vec![
            json!({
                "id": "gen-1721161200000-0",
                "pos": "P1",
                "type_original": "Duct fan IP54, FRC 60-30",
                "potential_artikuls": ["A-1", "B-2"],
                "manual_check_needed": true,
                "found_in_pdf_on_pages": [1]
            }),
            json!({
                "id": "gen-1721161200000-1",
                "pos": "P2",
                "type_original": "Label \"KVR\" 100/1",
                "potential_artikuls": [],
                "manual_check_needed": false,
                "found_in_pdf_on_pages": [1, 2]
            }),
        ];
        Dataset::from_json_values(values, &default_columns()).unwrap()
    }

    #[test]
    fn test_csv_header_follows_column_order() {
        let dataset = extracted();
        let csv = CsvExporter::to_csv(&dataset.rows, &dataset.columns).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "id,pos,type_original,potential_artikuls,manual_check_needed,found_in_pdf_on_pages"
        );
    }

    #[test]
    fn test_csv_quotes_every_field_and_escapes_quotes() {
        let dataset = extracted();
        let csv = CsvExporter::to_csv(&dataset.rows, &dataset.columns).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            r#""gen-1721161200000-0","P1","Duct fan IP54, FRC 60-30","A-1;B-2","true","1""#
        );
        assert_eq!(
            lines[2],
            r#""gen-1721161200000-1","P2","Label ""KVR"" 100/1","","false","1;2""#
        );
    }

    #[test]
    fn test_csv_uses_headers_not_keys() {
        let dataset = Dataset::default();
        let csv = CsvExporter::to_csv(&dataset.rows, &dataset.columns).unwrap();
        assert!(csv.starts_with("Field Name,Value,Category,Notes\n"));
        assert!(csv.contains(r#""Total Amount","$2,500.00","Financials","Includes 10% discount""#));
    }

    #[test]
    fn test_csv_missing_key_is_empty_field() {
        let columns = vec![
            ColumnDefinition::new("name", "Name", true),
            ColumnDefinition::new("absent", "Absent", true),
        ];
        let mut row = DataRow::new("1");
        row.set("name", json!("x"));
        let csv = CsvExporter::to_csv(&[row], &columns).unwrap();
        assert_eq!(csv, "Name,Absent\n\"x\",\"\"\n");
    }

    #[test]
    fn test_csv_reads_back_with_same_header_order() {
        let dataset = extracted();
        let csv = CsvExporter::to_csv(&dataset.rows, &dataset.columns).unwrap();

        let reloaded = CsvExporter::from_csv(&csv).unwrap();
        let original_headers: Vec<&str> = dataset.columns.iter().map(|c| c.header.as_str()).collect();
        let reloaded_keys: Vec<&str> = reloaded.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(original_headers, reloaded_keys);
        assert_eq!(reloaded.rows.len(), 2);
        assert_eq!(reloaded.rows[1].display("type_original"), "Label \"KVR\" 100/1");
        assert_eq!(reloaded.rows[0].id(), "gen-1721161200000-0");
    }

    #[test]
    fn test_from_csv_without_id_generates_ids() {
        let dataset = CsvExporter::from_csv("name,qty\nFan,2\nValve,1\n").unwrap();
        assert_eq!(dataset.rows.len(), 2);
        assert_ne!(dataset.rows[0].id(), dataset.rows[1].id());
        let keys: Vec<&str> = dataset.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["id", "name", "qty"]);
    }

    #[test]
    fn test_from_csv_header_only_keeps_header_columns() {
        let dataset = CsvExporter::from_csv("name,qty\n").unwrap();
        assert!(dataset.rows.is_empty());
        let keys: Vec<&str> = dataset.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "qty"]);
    }

    #[test]
    fn test_json_export_is_pretty_array() {
        let dataset = extracted();
        let text = CsvExporter::to_json(&dataset.rows).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": \"gen-1721161200000-0\","));

        let parsed: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["potential_artikuls"], json!(["A-1", "B-2"]));
        assert_eq!(parsed[1]["manual_check_needed"], json!(false));
    }
}
