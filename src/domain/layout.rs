//! Two-pane layout math.
//!
//! The PDF panel and the data grid share the terminal width, separated by a
//! one-cell resize handle. Below [`STACKED_BREAKPOINT`] the panes stack
//! vertically and resizing is disabled.

pub const MIN_PANEL_PERCENT: f64 = 20.0;
pub const MAX_PANEL_PERCENT: f64 = 80.0;
pub const DEFAULT_PANEL_PERCENT: f64 = 40.0;
pub const RESIZE_HANDLE_WIDTH: u16 = 1;
pub const STACKED_BREAKPOINT: u16 = 80;

/// Share of the width given to the PDF panel, and drag-resize state.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pdf_percent: f64,
    container_width: u16,
    resizing: bool,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            pdf_percent: DEFAULT_PANEL_PERCENT,
            container_width: 0,
            resizing: false,
        }
    }
}

impl PanelLayout {
    pub fn pdf_percent(&self) -> f64 {
        self.pdf_percent
    }

    pub fn container_width(&self) -> u16 {
        self.container_width
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing
    }

    pub fn is_stacked(&self) -> bool {
        self.container_width < STACKED_BREAKPOINT
    }

    /// Records a new terminal width.
    ///
    /// Entering the stacked layout stops any drag and restores the default
    /// split, so widening the terminal again starts from a known state.
    pub fn set_container_width(&mut self, width: u16) {
        self.container_width = width;
        if self.is_stacked() {
            self.resizing = false;
            self.pdf_percent = DEFAULT_PANEL_PERCENT;
        }
    }

    /// Starts a drag on the resize handle. Returns whether it started.
    pub fn begin_resize(&mut self) -> bool {
        if self.is_stacked() {
            return false;
        }
        self.resizing = true;
        true
    }

    /// Moves the split to a pointer position relative to the container.
    pub fn drag_to(&mut self, x: u16) {
        if !self.resizing || self.is_stacked() {
            return;
        }
        let total = self.panels_width();
        if total == 0 {
            return;
        }
        let percent = f64::from(x) / f64::from(total) * 100.0;
        self.pdf_percent = clamp_percent(percent);
    }

    pub fn end_resize(&mut self) {
        self.resizing = false;
    }

    /// Shifts the split by `delta` percentage points.
    pub fn nudge(&mut self, delta: f64) {
        if self.is_stacked() {
            return;
        }
        self.pdf_percent = clamp_percent(self.pdf_percent + delta);
    }

    /// Width left for the two panels once the handle is subtracted.
    pub fn panels_width(&self) -> u16 {
        self.container_width.saturating_sub(RESIZE_HANDLE_WIDTH)
    }

    pub fn pdf_panel_width(&self) -> u16 {
        if self.is_stacked() {
            return self.container_width;
        }
        let total = f64::from(self.panels_width());
        (total * self.pdf_percent / 100.0).round() as u16
    }

    pub fn grid_panel_width(&self) -> u16 {
        if self.is_stacked() {
            return self.container_width;
        }
        self.panels_width().saturating_sub(self.pdf_panel_width())
    }
}

fn clamp_percent(percent: f64) -> f64 {
    percent.clamp(MIN_PANEL_PERCENT, MAX_PANEL_PERCENT)
}
