//! Markdown to ANSI rendering for transcript-style terminal UIs.
//!
//! Output is deterministic for a given input, width and theme, so rendered messages can be
//! cached and re-rendered on resize without drift.
//!
//! # Public API Overview
//! - Render with [`Renderer::render_markdown_to_ansi`]; configure via [`RendererConfig`]
//!   (or [`RendererConfig::from_env`]).
//! - Pick a [`Theme`] by id (`dark`, `light`, `plain`) or pass one per call with
//!   [`Renderer::render_with_theme`].
//! - On terminal resize call [`Renderer::invalidate_for_width`] before re-rendering.
//! - Use the text and layout helpers for ANSI-safe formatting outside Markdown.

#![allow(clippy::type_complexity)]

pub mod cache;
pub mod config;
pub mod error;
pub mod highlight;
pub mod logging;
pub mod theme;

pub mod core;
pub mod markdown;
pub mod platform;
pub mod renderer;

/// Pipeline entry point and its configuration.
pub use crate::config::RendererConfig;
pub use crate::renderer::{Renderer, DEFAULT_WIDTH};

/// Cache statistics reported by [`Renderer::cache_stats`].
pub use crate::cache::{width_bucket, CacheStats};

/// Error types.
pub use crate::error::{HighlightError, RenderError};

/// Syntax highlighting.
pub use crate::highlight::{GrammarEngine, HighlightedCode, Highlighter};

/// Themes and style helpers.
pub use crate::theme::{StyleFn, Theme};

/// Layout helpers for bordered code and indented wrapping.
pub use crate::markdown::{box_code, wrap, BoxChrome};

/// ANSI-aware wrapping helper.
pub use crate::core::text::slice::wrap_text_with_ansi;
/// Escape stripping helper.
pub use crate::core::text::ansi::strip_ansi;
/// ANSI-aware truncation helper.
pub use crate::core::text::utils::truncate_to_width;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
