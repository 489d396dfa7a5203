//! Core text primitives shared by the renderer and layout engine.

pub mod text;
