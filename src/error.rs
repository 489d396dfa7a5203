use thiserror::Error;

/// Failures inside the rendering pipeline. None of them escape
/// [`Renderer::render_markdown_to_ansi`](crate::Renderer::render_markdown_to_ansi); they select
/// a degraded rendering path instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to initialize {resource}: {reason}")]
    Initialization {
        resource: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Highlight(#[from] HighlightError),

    #[error("markdown parse failed: {0}")]
    Parse(String),
}

/// Why a code block was left unhighlighted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HighlightError {
    #[error("syntax highlighter is not initialized")]
    Uninitialized,

    #[error("code block has no language tag")]
    MissingLanguage,

    #[error("no grammar for language `{0}`")]
    UnknownLanguage(String),

    #[error("grammar error: {0}")]
    Grammar(String),
}
