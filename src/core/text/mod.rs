//! Text helpers (ANSI parsing, width calculations, wrapping, slicing, padding).
//!
//! These helpers are pure (string in/string out) so the layout engine can depend on them
//! without pulling in the renderer.

pub mod ansi;
pub mod slice;
pub mod utils;
pub mod width;
