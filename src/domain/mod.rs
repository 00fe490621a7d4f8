pub mod models;
pub mod grid;
pub mod layout;
pub mod columns;
pub mod export;
pub mod errors;

pub use models::*;
pub use grid::*;
pub use layout::*;
pub use columns::*;
pub use export::*;
pub use errors::*;
