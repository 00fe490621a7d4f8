//! Presentation layer handling terminal UI and user input.
//!
//! This module manages the terminal user interface using ratatui, handles
//! keyboard and mouse input, and renders the PDF viewer beside the data grid.

pub mod areas;
pub mod ui;
pub mod input;

pub use areas::*;
pub use ui::*;
pub use input::*;
