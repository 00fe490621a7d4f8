//! Screen geometry shared by rendering and mouse hit-testing.

use crate::application::App;
use crate::domain::{PanelLayout, COLUMN_WIDTH, ROW_MARKER_WIDTH};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

/// Height of the smart mapper panel below the PDF viewer, borders included.
pub const MAPPER_HEIGHT: u16 = 7;

/// Every region the interface draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    pub header: Rect,
    pub pdf: Rect,
    pub mapper: Rect,
    /// Absent when the panels are stacked.
    pub handle: Option<Rect>,
    pub grid: Rect,
    pub status: Rect,
}

impl ScreenAreas {
    /// Splits the terminal into header, panels and status bar.
    ///
    /// Side by side, the panels get exactly the widths [`PanelLayout`]
    /// computes so that column paging and drawing agree.
    pub fn compute(area: Rect, layout: &PanelLayout) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(3)])
            .split(area);
        let main = chunks[1];

        let (pdf_column, handle, grid) = if layout.is_stacked() {
            let halves = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(main);
            (halves[0], None, halves[1])
        } else {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(layout.pdf_panel_width()),
                    Constraint::Length(1),
                    Constraint::Length(layout.grid_panel_width()),
                ])
                .split(main);
            (panes[0], Some(panes[1]), panes[2])
        };

        let pdf_split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(MAPPER_HEIGHT)])
            .split(pdf_column);

        Self {
            header: chunks[0],
            pdf: pdf_split[0],
            mapper: pdf_split[1],
            handle,
            grid,
            status: chunks[2],
        }
    }

    /// Areas for the terminal size last recorded in `app`.
    pub fn for_app(app: &App) -> Self {
        let (width, height) = app.screen;
        Self::compute(Rect::new(0, 0, width, height), &app.layout)
    }

    /// Lines available for PDF elements inside the viewer border.
    pub fn pdf_body_rows(&self) -> usize {
        usize::from(self.pdf.height.saturating_sub(2))
    }

    /// Lines available for data rows below the grid's header row.
    pub fn grid_body_rows(&self) -> usize {
        usize::from(self.grid.height.saturating_sub(3))
    }

    pub fn on_handle(&self, column: u16, row: u16) -> bool {
        self.handle
            .is_some_and(|handle| handle.contains(Position::new(column, row)))
    }

    /// Index of the PDF element drawn at a screen position.
    pub fn pdf_element_at(&self, app: &App, column: u16, row: u16) -> Option<usize> {
        let inner = inner(self.pdf);
        if !inner.contains(Position::new(column, row)) {
            return None;
        }
        let index = app.pdf_scroll + usize::from(row - inner.y);
        let count = app.current_page().map(|page| page.elements.len()).unwrap_or(0);
        (index < count).then_some(index)
    }

    /// Row and column index of the grid cell drawn at a screen position.
    pub fn grid_cell_at(&self, app: &App, column: u16, row: u16) -> Option<(usize, usize)> {
        let inner = inner(self.grid);
        if !inner.contains(Position::new(column, row)) || row == inner.y {
            return None;
        }
        let x = column - inner.x;
        if x < ROW_MARKER_WIDTH {
            return None;
        }

        let col = app.column_window.start() + usize::from((x - ROW_MARKER_WIDTH) / COLUMN_WIDTH);
        let data_row = app.scroll_row + usize::from(row - inner.y - 1);
        let on_screen = app.column_window.contains(col) && data_row < app.dataset.rows.len();
        on_screen.then_some((data_row, col))
    }
}

/// Keeps the row viewports in step with the current terminal size.
pub fn sync_viewport(app: &mut App) {
    let areas = ScreenAreas::for_app(app);
    app.update_viewport_size(areas.grid_body_rows(), areas.pdf_body_rows());
}

fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}
