use crate::application::{truncate, App, AppMode, Focus, ServiceStatus, Variant};
use crate::domain::{COLUMN_WIDTH, ROW_MARKER_WIDTH};
use crate::presentation::areas::ScreenAreas;
use ratatui::{
    layout::{Constraint, Flex, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

const TOAST_WIDTH: u16 = 50;
const TOAST_HEIGHT: u16 = 4;

pub fn render_ui(f: &mut Frame, app: &App) {
    let areas = ScreenAreas::compute(f.area(), &app.layout);

    render_header(f, app, areas.header);
    render_pdf_viewer(f, app, areas.pdf);
    render_mapper(f, app, areas.mapper);
    if let Some(handle) = areas.handle {
        render_handle(f, app, handle);
    }
    render_grid(f, app, areas.grid);
    render_status_bar(f, app, areas.status);
    render_notifications(f, app);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let (service, color) = match app.service {
        ServiceStatus::Unknown => ("unknown", Color::DarkGray),
        ServiceStatus::Checking => ("checking...", Color::Yellow),
        ServiceStatus::Available => ("available", Color::Green),
        ServiceStatus::Unavailable => ("unavailable", Color::Red),
    };
    let source = app
        .rows_file
        .as_deref()
        .unwrap_or(if app.pdf.is_some() { "extracted" } else { "sample" });

    let header = Line::from(vec![
        Span::styled(
            format!(
                "pdfgrid - PDF Data Editor | Data: {} | Row {}/{} | Service: ",
                source,
                (app.selected_row + 1).min(app.dataset.rows.len()),
                app.dataset.rows.len()
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(service, Style::default().fg(color)),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).border_style(border).title(title)
}

fn render_pdf_viewer(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Pdf;
    let Some(pdf) = &app.pdf else {
        let empty = Paragraph::new("No PDF loaded.\nPress Ctrl+O to open a document.")
            .style(Style::default().fg(Color::DarkGray))
            .block(pane_block("PDF Viewer".to_string(), focused));
        f.render_widget(empty, area);
        return;
    };

    let title = format!(
        "PDF: {} | Page {}/{}{}",
        pdf.file_name(),
        app.pdf_page + 1,
        pdf.pages.len(),
        if app.extracting { " | extracting..." } else { "" }
    );
    let visible = usize::from(area.height.saturating_sub(2));
    let lines: Vec<Line> = match app.current_page() {
        Some(page) if !page.elements.is_empty() => page
            .elements
            .iter()
            .enumerate()
            .skip(app.pdf_scroll)
            .take(visible)
            .map(|(index, element)| {
                let marker = if app.is_selected_pdf_element(&element.text) { "● " } else { "  " };
                let mut style = Style::default();
                if app.is_selected_pdf_element(&element.text) {
                    style = style.fg(Color::Green);
                }
                if focused && index == app.pdf_element {
                    style = style.bg(Color::Blue).fg(Color::White);
                }
                Line::from(Span::styled(format!("{marker}{}", element.text), style))
            })
            .collect(),
        _ => vec![Line::from(Span::styled(
            "(no text on this page)",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(Paragraph::new(lines).block(pane_block(title, focused)), area);
}

fn render_mapper(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    match &app.selected_pdf_text {
        Some(text) => lines.push(Line::from(vec![
            Span::styled("Selected: ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("\"{}\"", truncate(text, 40))),
        ])),
        None => lines.push(Line::from(Span::styled(
            "Select a PDF element (Enter or click) to map it.",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    if app.mapper.loading {
        lines.push(Line::from("Asking for a suggestion..."));
    } else if let Some(error) = &app.mapper.error {
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    } else if let Some(suggestion) = &app.mapper.suggestion {
        let (label, color) = if suggestion.is_confident() {
            ("high", Color::Green)
        } else {
            ("low", Color::Yellow)
        };
        lines.push(Line::from(vec![
            Span::raw("Suggested column: "),
            Span::styled(
                suggestion.suggested_column.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("Confidence: {:.0}% ({label})", suggestion.confidence_score * 100.0),
            Style::default().fg(color),
        )));
    }
    lines.push(Line::from(Span::styled(
        "m: suggest | a: apply to selected row",
        Style::default().fg(Color::DarkGray),
    )));

    let mapper = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Smart Mapper"));
    f.render_widget(mapper, area);
}

fn render_handle(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.layout.is_resizing() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(Block::default().borders(Borders::LEFT).border_style(style), area);
}

fn render_grid(f: &mut Frame, app: &App, area: Rect) {
    let window = app.column_window;
    let total = app.dataset.columns.len();
    let columns = &app.dataset.columns[window.start().min(total)..window.range().end.min(total)];

    let mut headers = vec![Cell::from("")];
    for (offset, column) in columns.iter().enumerate() {
        let col = window.start() + offset;
        let header_style = if col == app.selected_col {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let lock = if column.editable { "" } else { " (ro)" };
        headers.push(Cell::from(format!("{}{}", column.header, lock)).style(header_style));
    }
    let mut rows = vec![Row::new(headers).height(1)];

    let visible_rows = usize::from(area.height.saturating_sub(3));
    for (index, row) in app
        .dataset
        .rows
        .iter()
        .enumerate()
        .skip(app.scroll_row)
        .take(visible_rows)
    {
        let marker_style = if index == app.selected_row {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let mut cells = vec![Cell::from(format!("{}", index + 1)).style(marker_style)];

        for (offset, column) in columns.iter().enumerate() {
            let col = window.start() + offset;
            let cell = if app.is_editing_cell(row.id(), &column.key) {
                Cell::from(format!("{}▏", app.input)).style(Style::default().bg(Color::Green).fg(Color::Black))
            } else {
                let style = if index == app.selected_row && col == app.selected_col && app.focus == Focus::Grid {
                    Style::default().bg(Color::Blue).fg(Color::White)
                } else if column.editable {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Cell::from(row.display(&column.key)).style(style)
            };
            cells.push(cell);
        }
        rows.push(Row::new(cells).height(1));
    }

    let mut widths = vec![Constraint::Length(ROW_MARKER_WIDTH)];
    widths.extend(columns.iter().map(|_| Constraint::Length(COLUMN_WIDTH)));

    let table = Table::new(rows, widths)
        .block(pane_block(grid_title(app), app.focus == Focus::Grid))
        .column_spacing(0)
        .flex(Flex::Start);
    f.render_widget(table, area);
}

fn grid_title(app: &App) -> String {
    let window = app.column_window;
    if window.total() == 0 {
        return format!("Data | {} rows | no columns", app.dataset.rows.len());
    }
    format!(
        "Data | {} rows | {}Columns {}-{} of {}{}",
        app.dataset.rows.len(),
        if window.can_go_prev() { "◀ " } else { "" },
        window.start() + 1,
        window.range().end,
        window.total(),
        if window.can_go_next() { " ▶" } else { "" }
    )
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let input_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                "Tab: switch pane | Ctrl+O: open PDF | x: extract | m/a: map | Ctrl+L: load rows | Ctrl+S/E: export JSON/CSV | F1/?: help | q: quit".to_string()
            }
        }
        AppMode::Editing => format!("Editing: {} (Enter to save, Esc to cancel)", app.input),
        AppMode::Help => "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
        AppMode::LoadPdf => format!("Open PDF: {} (Enter to open, Esc to cancel)", app.filename_input),
        AppMode::LoadRows => format!("Load rows (JSON/CSV): {} (Enter to load, Esc to cancel)", app.filename_input),
        AppMode::ExportJson => format!("Export JSON as: {} (Enter to export, Esc to cancel)", app.filename_input),
        AppMode::ExportCsv => format!("Export CSV as: {} (Enter to export, Esc to cancel)", app.filename_input),
    };

    let input = Paragraph::new(input_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::LoadPdf | AppMode::LoadRows => Style::default().fg(Color::Yellow),
            AppMode::ExportJson | AppMode::ExportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(input, area);
}

fn render_notifications(f: &mut Frame, app: &App) {
    let area = f.area();
    let width = TOAST_WIDTH.min(area.width);
    let mut y = area.y + 1;

    for notification in app.notifications.iter().rev() {
        if y + TOAST_HEIGHT > area.height {
            break;
        }
        let toast_area = Rect {
            x: area.width - width,
            y,
            width,
            height: TOAST_HEIGHT,
        };
        let color = match notification.variant {
            Variant::Default => Color::Cyan,
            Variant::Destructive => Color::Red,
        };

        f.render_widget(Clear, toast_area);
        let toast = Paragraph::new(notification.description.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(Span::styled(
                        notification.title.clone(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    )),
            );
        f.render_widget(toast, toast_area);
        y += TOAST_HEIGHT;
    }
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("pdfgrid Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"PDFGRID - PDF DATA EDITOR

=== WORKFLOW ===
1. Ctrl+O opens a PDF; its pages appear in the left pane
2. x sends the PDF to the extraction service
3. The extracted rows replace the table on the right
4. Review and correct cells, then export with Ctrl+S or Ctrl+E

=== PANES ===
Tab             Switch focus between PDF viewer and data grid
< / >           Shrink / grow the PDF pane (or drag the divider)
                Below 80 columns the panes stack and cannot be resized

=== PDF VIEWER ===
↑↓ or j/k       Move between text elements
←→ or PgUp/PgDn Previous / next page
Enter or click  Select the element for smart mapping

=== SMART MAPPER ===
m               Ask which column the selected element belongs to
a               Write the element into the suggested column of the
                selected row
                Confidence above 70% is shown as high

=== DATA GRID ===
Arrow keys      Navigate cells (hjkl also work)
Enter/F2        Edit selected cell (or click an already selected cell)
[ / ]           Previous / next page of columns
n               Add an empty row
d / Delete      Delete selected row
y               Copy the selected cell or PDF element

Editing:
Enter           Save the cell
Esc             Discard changes
                Boolean cells accept true/false; list cells are
                comma separated
                The id column is read-only

=== FILES ===
Ctrl+O          Open a PDF document
Ctrl+L          Load rows from a JSON array or CSV file
Ctrl+S          Export rows as JSON (edited_data.json)
Ctrl+E          Export rows as CSV (edited_data.csv)
                CSV values are always quoted; lists are joined with ";"

=== SERVICE ===
Ctrl+R          Re-check the extraction service
                Extraction stays disabled while the service is down

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window

q               Quit application"#;
