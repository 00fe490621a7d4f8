use crate::domain::{ColumnDefinition, CsvExporter, DataRow, Dataset, EditorError, EditorResult};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const DEFAULT_JSON_EXPORT: &str = "edited_data.json";
pub const DEFAULT_CSV_EXPORT: &str = "edited_data.csv";

pub struct FileRepository;

impl FileRepository {
    /// Loads a row file, choosing CSV or JSON by extension.
    ///
    /// JSON files must hold an array of row objects. Columns are regenerated
    /// from the first row; an empty file keeps `fallback_columns`.
    pub fn load_rows(path: &Path, fallback_columns: &[ColumnDefinition]) -> EditorResult<Dataset> {
        let content = fs::read_to_string(path)?;
        let dataset = if has_extension(path, "csv") {
            CsvExporter::from_csv(&content)?
        } else {
            Self::parse_json_rows(&content, fallback_columns)?
        };
        log::info!("loaded {} rows from {}", dataset.rows.len(), path.display());
        Ok(dataset)
    }

    pub fn parse_json_rows(content: &str, fallback_columns: &[ColumnDefinition]) -> EditorResult<Dataset> {
        match serde_json::from_str::<Value>(content)? {
            Value::Array(values) => Dataset::from_json_values(values, fallback_columns),
            _ => Err(EditorError::InvalidRows("expected a JSON array of rows".to_string())),
        }
    }

    pub fn save_json(rows: &[DataRow], path: &Path) -> EditorResult<String> {
        let json = CsvExporter::to_json(rows)?;
        fs::write(path, json)?;
        log::info!("exported {} rows as JSON to {}", rows.len(), path.display());
        Ok(path.display().to_string())
    }

    pub fn save_csv(rows: &[DataRow], columns: &[ColumnDefinition], path: &Path) -> EditorResult<String> {
        let csv = CsvExporter::to_csv(rows, columns)?;
        fs::write(path, csv)?;
        log::info!("exported {} rows as CSV to {}", rows.len(), path.display());
        Ok(path.display().to_string())
    }
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
