//! Application state management for the PDF data editor.
//!
//! This module holds everything the terminal interface renders: the loaded
//! rows, the PDF pages, panel layout, selection and editing state, and the
//! outcome of calls to the extraction service.

use crate::application::notify::{truncate, Notifications};
use crate::application::tasks::{TaskResult, TaskRunner};
use crate::domain::{ColumnDefinition, ColumnWindow, Dataset, EditorResult, PanelLayout};
use crate::infrastructure::{
    MappingSuggestion, PdfDocument, PdfPage, ProcessOutcome, ServiceConfig, DEFAULT_API_URL,
    DEFAULT_CSV_EXPORT, DEFAULT_JSON_EXPORT,
};
use std::fs;
use std::time::Instant;

/// Percentage points moved by one keyboard resize step.
pub const RESIZE_STEP: f64 = 5.0;
const DEFAULT_PDF_FILENAME: &str = "document.pdf";
const DEFAULT_ROWS_FILENAME: &str = "rows.json";

/// Represents the current mode of the application.
///
/// The mode decides how keys are interpreted and which prompt the status
/// bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Navigation and shortcuts
    Normal,
    /// A grid cell is being edited inline
    Editing,
    /// Help screen is displayed
    Help,
    /// Prompting for a PDF path to open
    LoadPdf,
    /// Prompting for a JSON or CSV row file to open
    LoadRows,
    /// Prompting for the JSON export path
    ExportJson,
    /// Prompting for the CSV export path
    ExportCsv,
}

impl AppMode {
    pub fn is_filename_prompt(self) -> bool {
        matches!(
            self,
            AppMode::LoadPdf | AppMode::LoadRows | AppMode::ExportJson | AppMode::ExportCsv
        )
    }
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Pdf,
    Grid,
}

/// Reachability of the extraction service, which gates uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Unknown,
    Checking,
    Available,
    Unavailable,
}

/// The cell currently open in the inline editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingCell {
    pub row_id: String,
    pub column_key: String,
}

#[derive(Debug, Default)]
pub struct MapperState {
    pub loading: bool,
    /// Text of the request in flight; results for any other text are stale.
    pub pending_text: Option<String>,
    pub suggestion: Option<MappingSuggestion>,
    pub error: Option<String>,
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use pdfgrid::application::{App, Focus};
///
/// let app = App::default();
/// assert_eq!(app.selected_row, 0);
/// assert_eq!(app.focus, Focus::Grid);
/// assert_eq!(app.dataset.rows.len(), 5);
/// ```
#[derive(Debug)]
pub struct App {
    /// Rows and column definitions being reviewed
    pub dataset: Dataset,
    /// Split between the PDF panel and the grid
    pub layout: PanelLayout,
    /// Columns of the grid currently on screen
    pub column_window: ColumnWindow,
    pub focus: Focus,
    pub mode: AppMode,
    /// Selected grid row (index into `dataset.rows`)
    pub selected_row: usize,
    /// Selected grid column (index into `dataset.columns`)
    pub selected_col: usize,
    /// First grid row on screen
    pub scroll_row: usize,
    /// Grid body height in rows
    pub viewport_rows: usize,
    pub editing: Option<EditingCell>,
    /// Inline editor buffer
    pub input: String,
    /// Cursor within the active buffer, in characters
    pub cursor_position: usize,
    /// Buffer for filename prompts
    pub filename_input: String,
    pub help_scroll: usize,
    /// One-line message in the status bar
    pub status_message: Option<String>,
    pub notifications: Notifications,
    pub pdf: Option<PdfDocument>,
    /// Index into `pdf.pages`
    pub pdf_page: usize,
    /// Highlighted element on the current page
    pub pdf_element: usize,
    pub pdf_scroll: usize,
    pub pdf_viewport_rows: usize,
    /// Text of the element the user picked for mapping
    pub selected_pdf_text: Option<String>,
    pub mapper: MapperState,
    pub service: ServiceStatus,
    pub service_config: Option<ServiceConfig>,
    pub extracting: bool,
    /// Row file the dataset came from, if any
    pub rows_file: Option<String>,
    /// Last known terminal size (width, height)
    pub screen: (u16, u16),
    tasks: Option<TaskRunner>,
}

impl Default for App {
    fn default() -> Self {
        Self {
            dataset: Dataset::default(),
            layout: PanelLayout::default(),
            column_window: ColumnWindow::default(),
            focus: Focus::Grid,
            mode: AppMode::Normal,
            selected_row: 0,
            selected_col: 0,
            scroll_row: 0,
            viewport_rows: 20,
            editing: None,
            input: String::new(),
            cursor_position: 0,
            filename_input: String::new(),
            help_scroll: 0,
            status_message: None,
            notifications: Notifications::default(),
            pdf: None,
            pdf_page: 0,
            pdf_element: 0,
            pdf_scroll: 0,
            pdf_viewport_rows: 20,
            selected_pdf_text: None,
            mapper: MapperState::default(),
            service: ServiceStatus::Unknown,
            service_config: None,
            extracting: false,
            rows_file: None,
            screen: (0, 0),
            tasks: None,
        }
    }
}

impl App {
    /// Creates an app that talks to the extraction service through `tasks`.
    pub fn with_tasks(tasks: TaskRunner) -> Self {
        Self {
            tasks: Some(tasks),
            ..Self::default()
        }
    }

    pub fn api_url(&self) -> String {
        self.tasks
            .as_ref()
            .map(|tasks| tasks.client().config().api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    // ----- layout -----

    /// Records the terminal size and refits the panels and column window.
    pub fn set_screen_size(&mut self, width: u16, height: u16) {
        self.screen = (width, height);
        self.layout.set_container_width(width);
        self.refit_columns();
    }

    pub fn update_viewport_size(&mut self, grid_rows: usize, pdf_rows: usize) {
        self.viewport_rows = grid_rows.max(1);
        self.pdf_viewport_rows = pdf_rows.max(1);
        self.ensure_row_visible();
        self.ensure_pdf_element_visible();
    }

    /// Refits the column window to the grid panel width.
    ///
    /// An open cell editor is cancelled when the visible columns change.
    pub fn refit_columns(&mut self) {
        let before = self.column_window.range();
        let total = self.dataset.columns.len();
        self.selected_col = self.selected_col.min(total.saturating_sub(1));
        self.column_window.fit(total, self.layout.grid_panel_width());
        self.column_window.ensure_visible(self.selected_col);
        if self.column_window.range() != before && self.editing.is_some() {
            self.cancel_editing();
        }
    }

    pub fn nudge_split(&mut self, delta: f64) {
        self.layout.nudge(delta);
        self.refit_columns();
    }

    pub fn begin_resize(&mut self) -> bool {
        self.layout.begin_resize()
    }

    pub fn drag_split(&mut self, x: u16) {
        if self.layout.is_resizing() {
            self.layout.drag_to(x);
            self.refit_columns();
        }
    }

    pub fn end_resize(&mut self) {
        self.layout.end_resize();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Pdf => Focus::Grid,
            Focus::Grid => Focus::Pdf,
        };
    }

    // ----- grid navigation -----

    pub fn selected_row_id(&self) -> Option<String> {
        self.dataset.rows.get(self.selected_row).map(|row| row.id().to_string())
    }

    pub fn selected_column(&self) -> Option<&ColumnDefinition> {
        self.dataset.columns.get(self.selected_col)
    }

    pub fn move_row(&mut self, delta: isize) {
        let last = self.dataset.rows.len().saturating_sub(1);
        self.selected_row = self.selected_row.saturating_add_signed(delta).min(last);
        self.ensure_row_visible();
    }

    pub fn move_col(&mut self, delta: isize) {
        let last = self.dataset.columns.len().saturating_sub(1);
        self.selected_col = self.selected_col.saturating_add_signed(delta).min(last);
        self.column_window.ensure_visible(self.selected_col);
    }

    pub fn next_columns(&mut self) {
        if self.column_window.can_go_next() {
            self.cancel_editing();
            self.column_window.next();
            self.selected_col = self.column_window.start();
        }
    }

    pub fn prev_columns(&mut self) {
        if self.column_window.can_go_prev() {
            self.cancel_editing();
            self.column_window.prev();
            self.selected_col = self.column_window.start();
        }
    }

    /// Keeps the selected grid row inside the viewport.
    pub fn ensure_row_visible(&mut self) {
        if self.selected_row < self.scroll_row {
            self.scroll_row = self.selected_row;
        } else if self.selected_row >= self.scroll_row + self.viewport_rows {
            self.scroll_row = self.selected_row + 1 - self.viewport_rows;
        }
    }

    /// Selects a grid cell, committing any open edit first.
    ///
    /// Selecting the cell that is already selected opens it for editing.
    pub fn click_cell(&mut self, row: usize, col: usize) {
        if row >= self.dataset.rows.len() || col >= self.dataset.columns.len() {
            return;
        }
        if self.mode == AppMode::Editing {
            self.finish_editing();
        }
        let already_selected = self.focus == Focus::Grid && self.selected_row == row && self.selected_col == col;
        self.focus = Focus::Grid;
        self.selected_row = row;
        self.selected_col = col;
        self.ensure_row_visible();
        self.column_window.ensure_visible(col);
        if already_selected {
            self.start_editing();
        }
    }

    // ----- editing -----

    /// Opens the selected cell in the inline editor if its column is editable.
    pub fn start_editing(&mut self) {
        let (Some(row_id), Some(column)) = (self.selected_row_id(), self.selected_column().cloned()) else {
            return;
        };
        if !column.editable {
            self.status_message = Some(format!("Column '{}' is read-only", column.header));
            return;
        }

        self.input = self.dataset.edit_text(&row_id, &column.key);
        self.cursor_position = self.input.chars().count();
        self.editing = Some(EditingCell {
            row_id,
            column_key: column.key,
        });
        self.mode = AppMode::Editing;
        self.status_message = None;
    }

    /// Stores the editor contents into the edited cell.
    pub fn finish_editing(&mut self) {
        if let Some(cell) = self.editing.take() {
            self.dataset.set_cell_text(&cell.row_id, &cell.column_key, &self.input);
        }
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Discards the editor contents.
    pub fn cancel_editing(&mut self) {
        self.editing = None;
        if self.mode == AppMode::Editing {
            self.mode = AppMode::Normal;
        }
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn is_editing_cell(&self, row_id: &str, column_key: &str) -> bool {
        self.editing
            .as_ref()
            .is_some_and(|cell| cell.row_id == row_id && cell.column_key == column_key)
    }

    // ----- rows -----

    pub fn add_row(&mut self) {
        self.cancel_editing();
        let id = self.dataset.add_row();
        self.selected_row = self.dataset.rows.len() - 1;
        self.focus = Focus::Grid;
        self.ensure_row_visible();
        self.status_message = Some(format!("Added row {id}"));
    }

    pub fn delete_selected_row(&mut self) {
        let Some(id) = self.selected_row_id() else {
            return;
        };
        self.cancel_editing();
        self.dataset.delete_row(&id);
        self.selected_row = self.selected_row.min(self.dataset.rows.len().saturating_sub(1));
        self.ensure_row_visible();
        self.status_message = Some(format!("Deleted row {id}"));
    }

    /// Swaps in a new dataset and resets grid selection and paging.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        self.cancel_editing();
        self.dataset = dataset;
        self.selected_row = 0;
        self.selected_col = 0;
        self.scroll_row = 0;
        self.column_window = ColumnWindow::default();
        self.mapper.suggestion = None;
        self.refit_columns();
    }

    // ----- text input -----

    fn active_buffer(&mut self) -> Option<&mut String> {
        match self.mode {
            AppMode::Editing => Some(&mut self.input),
            mode if mode.is_filename_prompt() => Some(&mut self.filename_input),
            _ => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer() {
            let index = byte_index(buffer, cursor);
            buffer.insert(index, c);
            self.cursor_position += 1;
        }
    }

    pub fn delete_before_cursor(&mut self) {
        let cursor = self.cursor_position;
        if cursor == 0 {
            return;
        }
        if let Some(buffer) = self.active_buffer() {
            let index = byte_index(buffer, cursor - 1);
            buffer.remove(index);
            self.cursor_position -= 1;
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let cursor = self.cursor_position;
        if let Some(buffer) = self.active_buffer() {
            if cursor < buffer.chars().count() {
                let index = byte_index(buffer, cursor);
                buffer.remove(index);
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let len = self.active_buffer().map(|buffer| buffer.chars().count()).unwrap_or(0);
        if self.cursor_position < len {
            self.cursor_position += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.active_buffer().map(|buffer| buffer.chars().count()).unwrap_or(0);
    }

    // ----- filename prompts -----

    fn start_prompt(&mut self, mode: AppMode, initial: String) {
        self.cancel_editing();
        self.mode = mode;
        self.cursor_position = initial.chars().count();
        self.filename_input = initial;
        self.status_message = None;
    }

    pub fn start_load_pdf(&mut self) {
        let initial = self
            .pdf
            .as_ref()
            .map(|pdf| pdf.path.display().to_string())
            .unwrap_or_else(|| DEFAULT_PDF_FILENAME.to_string());
        self.start_prompt(AppMode::LoadPdf, initial);
    }

    pub fn start_load_rows(&mut self) {
        let initial = self.rows_file.clone().unwrap_or_else(|| DEFAULT_ROWS_FILENAME.to_string());
        self.start_prompt(AppMode::LoadRows, initial);
    }

    pub fn start_export_json(&mut self) {
        self.start_prompt(AppMode::ExportJson, DEFAULT_JSON_EXPORT.to_string());
    }

    pub fn start_export_csv(&mut self) {
        self.start_prompt(AppMode::ExportCsv, DEFAULT_CSV_EXPORT.to_string());
    }

    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// The path typed into the prompt, or the prompt's default when empty.
    pub fn prompt_filename(&self) -> String {
        if !self.filename_input.trim().is_empty() {
            return self.filename_input.trim().to_string();
        }
        match self.mode {
            AppMode::LoadPdf => DEFAULT_PDF_FILENAME,
            AppMode::LoadRows => DEFAULT_ROWS_FILENAME,
            AppMode::ExportCsv => DEFAULT_CSV_EXPORT,
            _ => DEFAULT_JSON_EXPORT,
        }
        .to_string()
    }

    fn close_prompt(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    // ----- results of file operations -----

    pub fn set_pdf_load_result(&mut self, result: EditorResult<PdfDocument>) {
        match result {
            Ok(document) => {
                self.notifications.info(
                    "PDF Loaded",
                    format!("{}: {} pages", document.file_name(), document.pages.len()),
                );
                self.pdf = Some(document);
                self.pdf_page = 0;
                self.pdf_element = 0;
                self.pdf_scroll = 0;
                self.selected_pdf_text = None;
                self.mapper = MapperState::default();
                self.focus = Focus::Pdf;
            }
            Err(err) => self.notifications.error("PDF Load Failed", err.to_string()),
        }
        self.close_prompt();
    }

    pub fn set_rows_load_result(&mut self, result: EditorResult<Dataset>, filename: String) {
        match result {
            Ok(dataset) => {
                self.notifications.info(
                    "Data Loaded",
                    format!("{} rows, {} columns from {}", dataset.rows.len(), dataset.columns.len(), filename),
                );
                self.replace_dataset(dataset);
                self.rows_file = Some(filename);
            }
            Err(err) => self.notifications.error("Load Failed", err.to_string()),
        }
        self.close_prompt();
    }

    pub fn set_export_result(&mut self, result: EditorResult<String>, format: &str) {
        match result {
            Ok(filename) => self.notifications.info(
                &format!("Exported as {format}"),
                format!("Data has been written to {filename}."),
            ),
            Err(err) => self.notifications.error("Export Failed", err.to_string()),
        }
        self.close_prompt();
    }

    pub fn set_copy_result(&mut self, result: EditorResult<()>, text: &str) {
        self.status_message = Some(match result {
            Ok(()) => format!("Copied \"{}\"", truncate(text, 40)),
            Err(err) => format!("Copy failed: {err}"),
        });
    }

    /// Text the copy shortcut puts on the clipboard for the focused pane.
    pub fn selection_text(&self) -> Option<String> {
        match self.focus {
            Focus::Pdf => self
                .current_page()
                .and_then(|page| page.elements.get(self.pdf_element))
                .map(|element| element.text.clone()),
            Focus::Grid => {
                let row_id = self.selected_row_id()?;
                let column = self.selected_column()?;
                Some(self.dataset.cell_display(&row_id, &column.key))
            }
        }
    }

    // ----- PDF pane -----

    pub fn current_page(&self) -> Option<&PdfPage> {
        self.pdf.as_ref().and_then(|pdf| pdf.page(self.pdf_page))
    }

    pub fn page_count(&self) -> usize {
        self.pdf.as_ref().map(|pdf| pdf.pages.len()).unwrap_or(0)
    }

    pub fn next_page(&mut self) {
        if self.pdf_page + 1 < self.page_count() {
            self.pdf_page += 1;
            self.pdf_element = 0;
            self.pdf_scroll = 0;
        }
    }

    pub fn prev_page(&mut self) {
        if self.pdf_page > 0 {
            self.pdf_page -= 1;
            self.pdf_element = 0;
            self.pdf_scroll = 0;
        }
    }

    pub fn move_pdf_element(&mut self, delta: isize) {
        let count = self.current_page().map(|page| page.elements.len()).unwrap_or(0);
        if count == 0 {
            return;
        }
        self.pdf_element = self.pdf_element.saturating_add_signed(delta).min(count - 1);
        self.ensure_pdf_element_visible();
    }

    fn ensure_pdf_element_visible(&mut self) {
        if self.pdf_element < self.pdf_scroll {
            self.pdf_scroll = self.pdf_element;
        } else if self.pdf_element >= self.pdf_scroll + self.pdf_viewport_rows {
            self.pdf_scroll = self.pdf_element + 1 - self.pdf_viewport_rows;
        }
    }

    /// Picks a PDF element as the source text for mapping.
    pub fn select_pdf_element(&mut self, index: usize) {
        let Some(text) = self
            .current_page()
            .and_then(|page| page.elements.get(index))
            .map(|element| element.text.clone())
        else {
            return;
        };

        self.focus = Focus::Pdf;
        self.pdf_element = index;
        self.ensure_pdf_element_visible();
        self.notifications
            .info("PDF Element Selected", format!("Text: \"{}\"", truncate(&text, 50)));
        self.selected_pdf_text = Some(text);
        self.mapper = MapperState::default();
    }

    pub fn is_selected_pdf_element(&self, text: &str) -> bool {
        self.selected_pdf_text.as_deref() == Some(text)
    }

    // ----- extraction service -----

    /// Starts a health check; extraction stays disabled until it succeeds.
    pub fn check_service(&mut self) {
        match &self.tasks {
            Some(tasks) => {
                self.service = ServiceStatus::Checking;
                tasks.check_service();
            }
            None => self.service = ServiceStatus::Unavailable,
        }
    }

    /// Sends the loaded PDF to the processing endpoint.
    pub fn start_extraction(&mut self) {
        if self.extracting {
            self.status_message = Some("Extraction already in progress".to_string());
            return;
        }
        let Some(path) = self.pdf.as_ref().map(|pdf| pdf.path.clone()) else {
            self.notifications
                .error("No PDF Loaded", "Load a PDF before sending it for extraction.");
            return;
        };
        if self.service != ServiceStatus::Available {
            let message = format!("The processing service at {} is not reachable.", self.api_url());
            self.notifications.error("Service Unavailable", message);
            return;
        }
        let Some(tasks) = &self.tasks else {
            self.notifications
                .error("Service Unavailable", "No processing service is configured.");
            return;
        };

        if let Some(config) = &self.service_config {
            let size = fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            if let Err(err) = config.check_upload(&name, size) {
                self.notifications.error("Upload Rejected", err.to_string());
                return;
            }
        }

        tasks.process_pdf(path.clone());
        self.extracting = true;
        self.status_message = Some(format!("Extracting data from {}...", path.display()));
    }

    /// Asks the mapping service which column the selected PDF text fits.
    pub fn suggest_mapping(&mut self) {
        let Some(text) = self.selected_pdf_text.clone() else {
            self.notifications.error(
                "No PDF Element Selected",
                "Please select an element from the PDF document first.",
            );
            return;
        };
        let columns = self.dataset.mappable_columns();
        if columns.is_empty() {
            self.notifications
                .error("No Data Columns", "There are no columns in the data table to map to.");
            return;
        }
        if self.mapper.loading {
            return;
        }

        self.mapper.suggestion = None;
        self.mapper.error = None;
        match &self.tasks {
            Some(tasks) => {
                self.mapper.loading = true;
                self.mapper.pending_text = Some(text.clone());
                tasks.suggest_mapping(text, columns);
            }
            None => {
                let message = "no mapping service is configured";
                self.mapper.error = Some(format!("Failed to get suggestion: {message}"));
                self.notifications.error(
                    "Smart Mapping Error",
                    format!("Could not get mapping suggestion. {message}"),
                );
            }
        }
    }

    /// Writes the selected PDF text into the suggested column of the
    /// selected row.
    pub fn apply_suggestion(&mut self) {
        let (Some(suggestion), Some(text)) = (self.mapper.suggestion.clone(), self.selected_pdf_text.clone()) else {
            self.status_message = Some("No mapping suggestion to apply".to_string());
            return;
        };
        let Some(row_id) = self.selected_row_id() else {
            self.notifications
                .error("No Row Selected", "Select a row in the table to receive the mapped value.");
            return;
        };
        let Some(col) = self
            .dataset
            .columns
            .iter()
            .position(|col| col.key == suggestion.suggested_column)
        else {
            self.notifications.error(
                "Mapping Failed",
                format!("Column \"{}\" no longer exists.", suggestion.suggested_column),
            );
            return;
        };

        self.cancel_editing();
        self.dataset.set_cell_text(&row_id, &suggestion.suggested_column, &text);
        self.selected_col = col;
        self.column_window.ensure_visible(col);
        self.notifications.info(
            "Mapping Applied",
            format!(
                "PDF element \"{}\" mapped to column \"{}\".",
                truncate(&text, 30),
                suggestion.suggested_column
            ),
        );
    }

    /// Applies every finished background job.
    pub fn poll_tasks(&mut self) {
        let results = match &self.tasks {
            Some(tasks) => tasks.drain(),
            None => Vec::new(),
        };
        for result in results {
            self.apply_task_result(result);
        }
    }

    pub fn apply_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Health(healthy) => {
                if healthy {
                    self.service = ServiceStatus::Available;
                } else {
                    self.service = ServiceStatus::Unavailable;
                    self.service_config = None;
                    let message = format!("PDF extraction is disabled: {} did not respond.", self.api_url());
                    self.notifications.error("Service Unavailable", message);
                }
            }
            TaskResult::ServiceConfig(Ok(config)) => self.service_config = Some(config),
            TaskResult::ServiceConfig(Err(err)) => {
                log::warn!("service limits unavailable: {err}");
            }
            TaskResult::Processed { file_name, result } => {
                self.extracting = false;
                self.status_message = None;
                self.set_extraction_result(result, &file_name);
            }
            TaskResult::Suggestion { text, result } => {
                let current = self.mapper.pending_text.as_deref() == Some(text.as_str())
                    && self.selected_pdf_text.as_deref() == Some(text.as_str());
                if !current {
                    log::debug!("dropping stale mapping suggestion for \"{}\"", truncate(&text, 30));
                    return;
                }
                self.mapper.loading = false;
                self.mapper.pending_text = None;
                match result {
                    Ok(suggestion) => self.mapper.suggestion = Some(suggestion),
                    Err(err) => {
                        self.mapper.error = Some(format!("Failed to get suggestion: {err}"));
                        self.notifications.error(
                            "Smart Mapping Error",
                            format!("Could not get mapping suggestion. {err}"),
                        );
                    }
                }
            }
        }
    }

    fn set_extraction_result(&mut self, result: EditorResult<ProcessOutcome>, file_name: &str) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.notifications.error("Extraction Failed", err.to_string());
                return;
            }
        };

        match Dataset::from_json_values(outcome.rows, &self.dataset.columns) {
            Ok(dataset) => {
                let timing = outcome
                    .processing_time
                    .map(|secs| format!(" in {secs:.2}s"))
                    .unwrap_or_default();
                self.notifications.info(
                    "Extraction Complete",
                    format!("{} rows from {}{}", dataset.rows.len(), file_name, timing),
                );
                self.replace_dataset(dataset);
                self.rows_file = None;
            }
            Err(err) => self.notifications.error("Extraction Failed", err.to_string()),
        }
    }

    /// Periodic housekeeping between frames.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);
        self.poll_tasks();
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
