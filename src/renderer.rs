//! Public entry point tying parser, walker, highlighter and caches together.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::warn;

use crate::cache::{width_bucket, CacheStats, RenderCache, Rendered};
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::highlight::Highlighter;
use crate::logging::{log_fallback, log_render_debug, RenderDebugInfo};
use crate::markdown::{render_legacy, walker, RenderContext};
use crate::platform;
use crate::theme::Theme;

pub const DEFAULT_WIDTH: usize = 80;

type ColumnsProbe = Box<dyn Fn() -> Option<usize> + Send + Sync>;

/// Renders Markdown to ANSI text. Shared by reference across threads; every method takes
/// `&self`.
pub struct Renderer {
    config: RendererConfig,
    theme: Theme,
    cache: RenderCache,
    highlighter: Highlighter,
    terminal_columns: ColumnsProbe,
    hyperlinks: bool,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            theme: resolve_theme(&config.theme),
            cache: RenderCache::new(config.tree_cache_capacity, config.render_cache_capacity),
            highlighter: Highlighter::new(config.syntax_theme.clone()),
            terminal_columns: Box::new(platform::terminal_columns),
            hyperlinks: config.hyperlinks && platform::supports_hyperlinks(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(RendererConfig::from_env())
    }

    pub fn with_highlighter(mut self, highlighter: Highlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Replaces the terminal width probe used to clamp code boxes.
    pub fn with_terminal_columns<F>(mut self, probe: F) -> Self
    where
        F: Fn() -> Option<usize> + Send + Sync + 'static,
    {
        self.terminal_columns = Box::new(probe);
        self
    }

    /// Overrides hyperlink detection.
    pub fn with_hyperlinks(mut self, enabled: bool) -> Self {
        self.hyperlinks = enabled;
        self
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Loads highlighting resources once. A no-op when highlighting is disabled.
    pub fn initialize(&self) -> Result<(), RenderError> {
        if !self.config.syntax_highlighting {
            return Ok(());
        }
        self.highlighter.initialize()
    }

    /// Never fails: initialization errors and render panics fall back to the legacy renderer.
    pub fn render_markdown_to_ansi(&self, markdown: &str, width: Option<usize>) -> String {
        self.render_with_theme(markdown, width, &self.theme)
    }

    pub fn render_with_theme(
        &self,
        markdown: &str,
        width: Option<usize>,
        theme: &Theme,
    ) -> String {
        let width = normalize_width(width);
        if let Err(err) = self.initialize() {
            log_fallback("initialization failed", Some(&err));
            return render_legacy(markdown, width, theme);
        }

        let started = Instant::now();
        let rendered =
            panic::catch_unwind(AssertUnwindSafe(|| self.render_cached(markdown, width, theme)));
        match rendered {
            Ok(rendered) => {
                log_render_debug(
                    self.config.debug,
                    &RenderDebugInfo {
                        width,
                        bucket: width_bucket(width),
                        theme: &theme.id,
                        cache_hit: rendered.cache_hit,
                        lines: rendered.output.lines().count(),
                        elapsed: started.elapsed(),
                    },
                );
                rendered.output.to_string()
            }
            Err(_) => {
                log_fallback("render panicked", None);
                render_legacy(markdown, width, theme)
            }
        }
    }

    fn render_cached(&self, markdown: &str, width: usize, theme: &Theme) -> Rendered {
        let terminal_width = (self.terminal_columns)();
        self.cache.get_or_render(markdown, width, &theme.id, |tree| {
            let mut ctx = RenderContext::new(width, theme);
            ctx.interactive = self.hyperlinks;
            ctx.terminal_width = terminal_width;
            ctx.heading_rule = self.config.heading_rule;
            ctx.highlighter = self
                .config
                .syntax_highlighting
                .then_some(&self.highlighter);
            walker::render(tree, &ctx)
        })
    }

    /// Call on resize before re-rendering at the new width.
    pub fn invalidate_for_width(&self, width: usize) {
        self.cache.invalidate_for_width(width);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

fn normalize_width(width: Option<usize>) -> usize {
    width.filter(|width| *width > 0).unwrap_or(DEFAULT_WIDTH)
}

fn resolve_theme(id: &str) -> Theme {
    Theme::by_id(id).unwrap_or_else(|| {
        warn!(
            theme = id,
            available = ?Theme::builtin_ids(),
            "unknown markdown theme, using dark"
        );
        Theme::dark()
    })
}
