//! Infrastructure layer providing external service integrations.
//!
//! This module contains file I/O for row sets, local PDF loading, runtime
//! configuration, and the HTTP client for the extraction service.

pub mod persistence;
pub mod pdf;
pub mod api;
pub mod config;
pub mod clipboard;

pub use persistence::*;
pub use pdf::*;
pub use api::*;
pub use config::*;
pub use clipboard::*;
