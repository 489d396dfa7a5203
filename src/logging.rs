//! Render diagnostics over `tracing`.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::RenderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderDebugInfo<'a> {
    pub width: usize,
    pub bucket: usize,
    pub theme: &'a str,
    pub cache_hit: bool,
    pub lines: usize,
    pub elapsed: Duration,
}

/// Per-call summary, emitted only when debug output is enabled.
pub fn log_render_debug(enabled: bool, info: &RenderDebugInfo<'_>) {
    if !enabled {
        return;
    }
    debug!(
        width = info.width,
        bucket = info.bucket,
        theme = info.theme,
        cache_hit = info.cache_hit,
        lines = info.lines,
        elapsed_us = info.elapsed.as_micros() as u64,
        "rendered markdown"
    );
}

/// Always emitted: the caller is about to use the legacy renderer.
pub fn log_fallback(reason: &str, err: Option<&RenderError>) {
    match err {
        Some(err) => warn!(%err, reason, "falling back to legacy markdown renderer"),
        None => warn!(reason, "falling back to legacy markdown renderer"),
    }
}
