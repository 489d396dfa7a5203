//! Markdown parsing, layout and rendering.

pub mod layout;
pub mod legacy;
pub mod parser;
pub mod table;
pub mod walker;

pub use layout::{box_code, wrap, BoxChrome};
pub use legacy::render_legacy;
pub use parser::parse;
pub use walker::{render, RenderContext};
