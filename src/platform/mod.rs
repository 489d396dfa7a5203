//! Platform-specific terminal integrations.

pub mod terminal;

pub use terminal::{supports_hyperlinks, terminal_columns};
