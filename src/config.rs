//! Renderer configuration and its environment overrides.

use std::env;

use crate::cache::{DEFAULT_RENDER_CAPACITY, DEFAULT_TREE_CAPACITY};
use crate::highlight::syntect_engine::DEFAULT_SYNTAX_THEME;
use crate::theme;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Markdown theme id: `dark`, `light` or `plain`.
    pub theme: String,
    pub syntax_theme: String,
    pub syntax_highlighting: bool,
    /// OSC-8 links, still subject to terminal detection.
    pub hyperlinks: bool,
    pub heading_rule: bool,
    pub debug: bool,
    pub tree_cache_capacity: usize,
    pub render_cache_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            theme: theme::DARK.to_string(),
            syntax_theme: DEFAULT_SYNTAX_THEME.to_string(),
            syntax_highlighting: true,
            hyperlinks: false,
            heading_rule: true,
            debug: false,
            tree_cache_capacity: DEFAULT_TREE_CAPACITY,
            render_cache_capacity: DEFAULT_RENDER_CAPACITY,
        }
    }
}

impl RendererConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            theme: env_string_opt("TAPE_MARKDOWN_THEME").unwrap_or(defaults.theme),
            syntax_theme: env_string_opt("TAPE_MARKDOWN_SYNTAX_THEME")
                .unwrap_or(defaults.syntax_theme),
            syntax_highlighting: !env_flag("TAPE_MARKDOWN_NO_HIGHLIGHT"),
            hyperlinks: env_flag("TAPE_MARKDOWN_HYPERLINKS"),
            heading_rule: !env_flag("TAPE_MARKDOWN_NO_HEADING_RULE"),
            debug: env_flag("TAPE_MARKDOWN_DEBUG"),
            tree_cache_capacity: env_usize("TAPE_MARKDOWN_TREE_CACHE")
                .unwrap_or(defaults.tree_cache_capacity),
            render_cache_capacity: env_usize("TAPE_MARKDOWN_RENDER_CACHE")
                .unwrap_or(defaults.render_cache_capacity),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

fn env_usize(key: &str) -> Option<usize> {
    env_string_opt(key).and_then(|value| value.trim().parse().ok())
}
