//! pdfgrid - PDF Data Editor Library
//!
//! Reviewing data extracted from PDF documents in the terminal: a paged PDF
//! text viewer beside an editable, column-paged data grid, backed by an HTTP
//! extraction service and JSON/CSV export.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
