//! Application layer managing state and background work.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the editor state machine, transient notifications, and the threads that
//! talk to the extraction service.

pub mod state;
pub mod notify;
pub mod tasks;

pub use state::*;
pub use notify::*;
pub use tasks::*;
