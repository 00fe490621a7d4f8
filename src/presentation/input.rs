use crate::application::{App, AppMode, Focus, RESIZE_STEP};
use crate::infrastructure::{copy_to_clipboard, FileRepository, PdfDocument};
use crate::presentation::areas::ScreenAreas;
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::path::Path;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::LoadPdf | AppMode::LoadRows | AppMode::ExportJson | AppMode::ExportCsv => {
                Self::handle_filename_input_mode(app, key)
            }
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('o') => app.start_load_pdf(),
                KeyCode::Char('l') => app.start_load_rows(),
                KeyCode::Char('s') => app.start_export_json(),
                KeyCode::Char('e') => app.start_export_csv(),
                KeyCode::Char('r') => app.check_service(),
                _ => {}
            }
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::Tab => app.toggle_focus(),
            KeyCode::Up | KeyCode::Char('k') => match app.focus {
                Focus::Grid => app.move_row(-1),
                Focus::Pdf => app.move_pdf_element(-1),
            },
            KeyCode::Down | KeyCode::Char('j') => match app.focus {
                Focus::Grid => app.move_row(1),
                Focus::Pdf => app.move_pdf_element(1),
            },
            KeyCode::Left | KeyCode::Char('h') => match app.focus {
                Focus::Grid => app.move_col(-1),
                Focus::Pdf => app.prev_page(),
            },
            KeyCode::Right | KeyCode::Char('l') => match app.focus {
                Focus::Grid => app.move_col(1),
                Focus::Pdf => app.next_page(),
            },
            KeyCode::PageUp => app.prev_page(),
            KeyCode::PageDown => app.next_page(),
            KeyCode::Enter => match app.focus {
                Focus::Grid => app.start_editing(),
                Focus::Pdf => app.select_pdf_element(app.pdf_element),
            },
            KeyCode::F(2) => {
                app.focus = Focus::Grid;
                app.start_editing();
            }
            KeyCode::Char('[') => app.prev_columns(),
            KeyCode::Char(']') => app.next_columns(),
            KeyCode::Char('<') => app.nudge_split(-RESIZE_STEP),
            KeyCode::Char('>') => app.nudge_split(RESIZE_STEP),
            KeyCode::Char('x') => app.start_extraction(),
            KeyCode::Char('m') => app.suggest_mapping(),
            KeyCode::Char('a') => app.apply_suggestion(),
            KeyCode::Char('n') => app.add_row(),
            KeyCode::Char('d') | KeyCode::Delete if app.focus == Focus::Grid => app.delete_selected_row(),
            KeyCode::Char('y') => {
                if let Some(text) = app.selection_text() {
                    let result = copy_to_clipboard(&text);
                    app.set_copy_result(result, &text);
                }
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Char('q') => {
                // Will be handled by main loop
            }
            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Tab => {
                app.finish_editing();
                app.move_col(1);
            }
            _ => Self::handle_text_input(app, key),
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }

    fn handle_filename_input_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                let filename = app.prompt_filename();
                let path = Path::new(&filename);
                match app.mode {
                    AppMode::LoadPdf => {
                        let result = PdfDocument::open(path);
                        app.set_pdf_load_result(result);
                    }
                    AppMode::LoadRows => {
                        let result = FileRepository::load_rows(path, &app.dataset.columns);
                        app.set_rows_load_result(result, filename);
                    }
                    AppMode::ExportJson => {
                        let result = FileRepository::save_json(&app.dataset.rows, path);
                        app.set_export_result(result, "JSON");
                    }
                    AppMode::ExportCsv => {
                        let result = FileRepository::save_csv(&app.dataset.rows, &app.dataset.columns, path);
                        app.set_export_result(result, "CSV");
                    }
                    _ => {}
                }
            }
            KeyCode::Esc => app.cancel_filename_input(),
            _ => Self::handle_text_input(app, key),
        }
    }

    fn handle_text_input(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Backspace => app.delete_before_cursor(),
            KeyCode::Delete => app.delete_at_cursor(),
            KeyCode::Left => app.cursor_left(),
            KeyCode::Right => app.cursor_right(),
            KeyCode::Home => app.cursor_home(),
            KeyCode::End => app.cursor_end(),
            KeyCode::Char(c) => app.insert_char(c),
            _ => {}
        }
    }

    pub fn handle_mouse_event(app: &mut App, event: MouseEvent) {
        if !matches!(app.mode, AppMode::Normal | AppMode::Editing) {
            return;
        }
        let areas = ScreenAreas::for_app(app);
        let (column, row) = (event.column, event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let cell = areas.grid_cell_at(app, column, row);
                if app.mode == AppMode::Editing {
                    if cell == Some((app.selected_row, app.selected_col)) {
                        return;
                    }
                    app.finish_editing();
                }
                if areas.on_handle(column, row) && app.begin_resize() {
                    return;
                }
                if let Some(index) = areas.pdf_element_at(app, column, row) {
                    app.select_pdf_element(index);
                } else if let Some((data_row, col)) = cell {
                    app.click_cell(data_row, col);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => app.drag_split(column),
            MouseEventKind::Up(MouseButton::Left) => app.end_resize(),
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp if app.mode == AppMode::Normal => {
                let delta = if event.kind == MouseEventKind::ScrollDown { 1 } else { -1 };
                if areas.pdf.contains((column, row).into()) {
                    app.move_pdf_element(delta);
                } else if areas.grid.contains((column, row).into()) {
                    app.move_row(delta);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Dataset;
    use crate::infrastructure::PdfPage;
    use std::path::PathBuf;

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE);
    }

    fn click(app: &mut App, kind: MouseEventKind, column: u16, row: u16) {
        InputHandler::handle_mouse_event(
            app,
            MouseEvent {
                kind,
                column,
                row,
                modifiers: KeyModifiers::NONE,
            },
        );
    }

    fn app_with_pdf() -> App {
        let mut app = App::default();
        app.set_screen_size(200, 40);
        app.set_pdf_load_result(Ok(PdfDocument {
            path: PathBuf::from("equipment.pdf"),
            pages: vec![
                PdfPage::from_text(1, "Pos.: P1\nName: ITP"),
                PdfPage::from_text(2, "Qty: 1"),
            ],
        }));
        app
    }

    #[test]
    fn test_export_key_bindings() {
        let mut app = App::default();

        InputHandler::handle_key_event(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, AppMode::ExportJson);
        assert_eq!(app.filename_input, "edited_data.json");

        press(&mut app, KeyCode::Esc);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, AppMode::ExportCsv);
        assert_eq!(app.filename_input, "edited_data.csv");
    }

    #[test]
    fn test_load_key_bindings() {
        let mut app = App::default();

        InputHandler::handle_key_event(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, AppMode::LoadPdf);

        press(&mut app, KeyCode::Esc);
        InputHandler::handle_key_event(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert_eq!(app.mode, AppMode::LoadRows);
        assert_eq!(app.filename_input, "rows.json");
    }

    #[test]
    fn test_filename_input() {
        let mut app = App::default();
        app.start_export_csv();

        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.filename_input, "edited_data.csvx");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.filename_input, "edited_data.csv");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.filename_input.is_empty());
    }

    #[test]
    fn test_export_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review.json");
        let mut app = App::default();
        app.dataset.set_cell_text("2", "notes", "checked");

        app.start_export_json();
        app.filename_input = path.display().to_string();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.notifications.latest().unwrap().title, "Exported as JSON");

        app.replace_dataset(Dataset::from_json_values(Vec::new(), &[]).unwrap());
        app.start_load_rows();
        app.filename_input = path.display().to_string();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.dataset.rows.len(), 5);
        assert_eq!(app.dataset.rows[1].display("notes"), "checked");
        assert_eq!(app.dataset.columns[0].key, "id");
    }

    #[test]
    fn test_csv_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut app = App::default();

        app.start_export_csv();
        app.filename_input = path.display().to_string();
        press(&mut app, KeyCode::Enter);

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Field Name,Value,Category,Notes\n"));
        assert_eq!(written.lines().count(), 6);
    }

    #[test]
    fn test_missing_pdf_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::default();
        app.start_load_pdf();
        app.filename_input = dir.path().join("absent.pdf").display().to_string();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.pdf.is_none());
        assert_eq!(app.notifications.latest().unwrap().title, "PDF Load Failed");
    }

    #[test]
    fn test_edit_cell_with_keys() {
        let mut app = App::default();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Editing);

        press(&mut app, KeyCode::End);
        for _ in 0.."Inc.".len() {
            press(&mut app, KeyCode::Backspace);
        }
        for c in "GmbH".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.dataset.rows[1].display("fieldValue"), "Stellar Solutions GmbH");
    }

    #[test]
    fn test_escape_discards_edit() {
        let mut app = App::default();
        press(&mut app, KeyCode::F(2));
        press(&mut app, KeyCode::Char('!'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.dataset.rows[0].display("fieldName"), "Invoice Number");
    }

    #[test]
    fn test_row_keys() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.dataset.rows.len(), 6);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.dataset.rows.len(), 5);
        press(&mut app, KeyCode::Delete);
        assert_eq!(app.dataset.rows.len(), 4);
    }

    #[test]
    fn test_pdf_focus_navigation() {
        let mut app = app_with_pdf();
        assert_eq!(app.focus, Focus::Pdf);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.selected_pdf_text.as_deref(), Some("Name: ITP"));

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.dataset.rows.len(), 5);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.pdf_page, 1);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.pdf_page, 0);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Grid);
    }

    #[test]
    fn test_split_keys() {
        let mut app = App::default();
        app.set_screen_size(200, 40);
        press(&mut app, KeyCode::Char('>'));
        assert_eq!(app.layout.pdf_percent(), 45.0);
        press(&mut app, KeyCode::Char('<'));
        press(&mut app, KeyCode::Char('<'));
        assert_eq!(app.layout.pdf_percent(), 35.0);
    }

    #[test]
    fn test_help_mode() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.mode, AppMode::Help);
        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.help_scroll, 4);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn test_mouse_click_selects_and_edits_cell() {
        let mut app = App::default();
        app.set_screen_size(200, 40);

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 104, 4);
        assert_eq!((app.selected_row, app.selected_col), (1, 1));
        assert_eq!(app.mode, AppMode::Normal);

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 104, 4);
        assert_eq!(app.mode, AppMode::Editing);

        app.input = "ACME".to_string();
        click(&mut app, MouseEventKind::Down(MouseButton::Left), 86, 3);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.dataset.rows[1].display("fieldValue"), "ACME");
        assert_eq!((app.selected_row, app.selected_col), (0, 0));
    }

    #[test]
    fn test_click_outside_cells_commits_edit() {
        let mut app = App::default();
        app.set_screen_size(200, 40);
        app.selected_row = 1;
        app.selected_col = 1;
        app.start_editing();
        app.input = "ACME".to_string();

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 104, 4);
        assert_eq!(app.mode, AppMode::Editing);

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 5, 0);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.editing.is_none());
        assert_eq!(app.dataset.rows[1].display("fieldValue"), "ACME");
    }

    #[test]
    fn test_mouse_selects_pdf_element() {
        let mut app = app_with_pdf();
        click(&mut app, MouseEventKind::Down(MouseButton::Left), 10, 3);
        assert_eq!(app.selected_pdf_text.as_deref(), Some("Name: ITP"));
        assert_eq!(app.notifications.latest().unwrap().title, "PDF Element Selected");
    }

    #[test]
    fn test_mouse_drag_resizes() {
        let mut app = App::default();
        app.set_screen_size(200, 40);

        click(&mut app, MouseEventKind::Down(MouseButton::Left), 80, 10);
        assert!(app.layout.is_resizing());
        click(&mut app, MouseEventKind::Drag(MouseButton::Left), 199, 10);
        assert_eq!(app.layout.pdf_percent(), 80.0);
        click(&mut app, MouseEventKind::Up(MouseButton::Left), 199, 10);
        assert!(!app.layout.is_resizing());

        click(&mut app, MouseEventKind::Drag(MouseButton::Left), 10, 10);
        assert_eq!(app.layout.pdf_percent(), 80.0);
    }

    #[test]
    fn test_mouse_ignored_in_prompt() {
        let mut app = App::default();
        app.set_screen_size(200, 40);
        app.start_export_json();
        click(&mut app, MouseEventKind::Down(MouseButton::Left), 104, 4);
        assert_eq!(app.selected_row, 0);
    }
}
