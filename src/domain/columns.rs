//! Column pagination for the data grid.
//!
//! The grid shows as many fixed-width columns as fit in its panel and pages
//! through the rest. The window is recomputed whenever the panel width or the
//! column set changes.

use std::ops::Range;

/// Width of every data column, in cells.
pub const COLUMN_WIDTH: u16 = 18;
/// Width of the leading row-marker column.
pub const ROW_MARKER_WIDTH: u16 = 4;
/// Left and right panel borders.
const BORDER_WIDTH: u16 = 2;

/// The slice of columns currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnWindow {
    start: usize,
    visible: usize,
    total: usize,
}

impl ColumnWindow {
    /// Number of columns a panel of `panel_width` cells can hold; never zero.
    pub fn capacity(panel_width: u16) -> usize {
        let usable = panel_width.saturating_sub(BORDER_WIDTH + ROW_MARKER_WIDTH);
        usize::from(usable / COLUMN_WIDTH).max(1)
    }

    /// Refits the window to a column count and panel width.
    ///
    /// The start index is kept where possible and clamped so the window
    /// never runs past the last column.
    pub fn fit(&mut self, total: usize, panel_width: u16) {
        self.total = total;
        self.visible = Self::capacity(panel_width).min(total);
        self.clamp_start();
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.visible
    }

    pub fn contains(&self, col: usize) -> bool {
        self.range().contains(&col)
    }

    pub fn can_go_next(&self) -> bool {
        self.start + self.visible < self.total
    }

    pub fn can_go_prev(&self) -> bool {
        self.start > 0
    }

    pub fn next(&mut self) {
        if self.can_go_next() {
            self.start += self.visible;
            self.clamp_start();
        }
    }

    pub fn prev(&mut self) {
        self.start = self.start.saturating_sub(self.visible.max(1));
    }

    /// Scrolls just far enough to show column `col`.
    pub fn ensure_visible(&mut self, col: usize) {
        if self.visible == 0 {
            return;
        }
        if col < self.start {
            self.start = col;
        } else if col >= self.start + self.visible {
            self.start = col + 1 - self.visible;
        }
        self.clamp_start();
    }

    fn clamp_start(&mut self) {
        self.start = self.start.min(self.total - self.visible);
    }
}
