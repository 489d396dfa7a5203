//! Syntax highlighting for fenced code blocks.
//!
//! [`Highlighter`] owns a lazily loaded [`GrammarEngine`]. Loading happens at most once per
//! highlighter; threads that arrive while a load is in flight block on the same
//! [`OnceCell`] and share its result. A failed load leaves the cell empty so a later call can
//! retry.

pub mod syntect_engine;
pub mod token;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{HighlightError, RenderError};
use syntect_engine::{SyntectEngine, DEFAULT_SYNTAX_THEME};
use token::RawToken;

/// Tokenizes code into per-line token runs.
pub trait GrammarEngine: Send + Sync {
    /// Returns exactly one token line per `\n`-separated source line.
    fn tokenize(
        &self,
        code: &str,
        language: &str,
        theme: &str,
    ) -> Result<Vec<Vec<RawToken>>, HighlightError>;
}

pub type EngineLoader =
    Box<dyn Fn(&str) -> Result<Box<dyn GrammarEngine>, RenderError> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightedCode {
    pub lines: Vec<String>,
    /// `false` when `lines` is the untouched source.
    pub highlighted: bool,
}

impl HighlightedCode {
    pub fn plain(code: &str) -> Self {
        Self {
            lines: code.split('\n').map(str::to_string).collect(),
            highlighted: false,
        }
    }
}

pub struct Highlighter {
    theme: String,
    loader: EngineLoader,
    engine: OnceCell<Box<dyn GrammarEngine>>,
}

impl Highlighter {
    pub fn new(theme: impl Into<String>) -> Self {
        Self::with_loader(theme, |theme| {
            SyntectEngine::load(theme).map(|engine| Box::new(engine) as Box<dyn GrammarEngine>)
        })
    }

    pub fn with_loader<F>(theme: impl Into<String>, loader: F) -> Self
    where
        F: Fn(&str) -> Result<Box<dyn GrammarEngine>, RenderError> + Send + Sync + 'static,
    {
        Self {
            theme: theme.into(),
            loader: Box::new(loader),
            engine: OnceCell::new(),
        }
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.get().is_some()
    }

    /// Loads grammar resources on first use. Idempotent.
    pub fn initialize(&self) -> Result<(), RenderError> {
        self.engine
            .get_or_try_init(|| {
                debug!(theme = %self.theme, "loading syntax highlighting resources");
                (self.loader)(&self.theme)
            })
            .map(|_| ())
    }

    /// Highlights `code`, or returns it unhighlighted when the highlighter is not initialized,
    /// the language is missing or unknown, or the grammar fails.
    pub fn highlight(&self, code: &str, language: Option<&str>) -> HighlightedCode {
        match self.try_highlight(code, language) {
            Ok(lines) => HighlightedCode {
                lines,
                highlighted: true,
            },
            Err(err) => {
                debug!(%err, language = language.unwrap_or(""), "code block left unhighlighted");
                HighlightedCode::plain(code)
            }
        }
    }

    fn try_highlight(
        &self,
        code: &str,
        language: Option<&str>,
    ) -> Result<Vec<String>, HighlightError> {
        let engine = self.engine.get().ok_or(HighlightError::Uninitialized)?;
        let language = language
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .ok_or(HighlightError::MissingLanguage)?;

        let lines = engine.tokenize(code, resolve_alias(language), &self.theme)?;
        if lines.len() != code.split('\n').count() {
            return Err(HighlightError::Grammar(format!(
                "engine returned {} lines for {} source lines",
                lines.len(),
                code.split('\n').count()
            )));
        }
        Ok(lines.into_iter().map(token::render_line).collect())
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTAX_THEME)
    }
}

/// Maps common fence tags onto grammar names the bundled syntax set knows.
pub fn resolve_alias(language: &str) -> &str {
    match language.to_ascii_lowercase().as_str() {
        "sh" | "shell" | "zsh" | "console" | "shellscript" => "bash",
        "js" | "jsx" | "mjs" | "cjs" | "node" => "js",
        "py" | "python3" => "python",
        "rs" => "rust",
        "yml" => "yaml",
        "md" => "markdown",
        "c++" | "hpp" | "cc" => "cpp",
        "golang" => "go",
        "rb" => "ruby",
        "cs" | "c#" => "cs",
        "text" | "plaintext" | "plain" => "txt",
        _ => language,
    }
}

#[cfg(test)]
mod tests {
    use super::token::RawToken;
    use super::{GrammarEngine, HighlightedCode, Highlighter};
    use crate::error::{HighlightError, RenderError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    struct EchoEngine;

    impl GrammarEngine for EchoEngine {
        fn tokenize(
            &self,
            code: &str,
            language: &str,
            _theme: &str,
        ) -> Result<Vec<Vec<RawToken>>, HighlightError> {
            if language != "echo" {
                return Err(HighlightError::UnknownLanguage(language.to_string()));
            }
            Ok(code
                .split('\n')
                .map(|line| {
                    vec![RawToken {
                        color: Some("#010203".into()),
                        ..RawToken::new(line)
                    }]
                })
                .collect())
        }
    }

    fn echo_highlighter(loads: Arc<AtomicUsize>) -> Highlighter {
        Highlighter::with_loader("test", move |_| {
            loads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(Box::new(EchoEngine) as Box<dyn GrammarEngine>)
        })
    }

    #[test]
    fn uninitialized_highlighter_returns_source() {
        let highlighter = echo_highlighter(Arc::new(AtomicUsize::new(0)));
        assert_eq!(
            highlighter.highlight("a\nb", Some("echo")),
            HighlightedCode::plain("a\nb")
        );
    }

    #[test]
    fn concurrent_initialization_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let highlighter = Arc::new(echo_highlighter(loads.clone()));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let highlighter = highlighter.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    highlighter.initialize()
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread").expect("initialize");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(highlighter.is_initialized());
    }

    #[test]
    fn failed_initialization_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let highlighter = Highlighter::with_loader("test", move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RenderError::Initialization {
                    resource: "grammar",
                    reason: "offline".into(),
                })
            } else {
                Ok(Box::new(EchoEngine) as Box<dyn GrammarEngine>)
            }
        });

        assert!(highlighter.initialize().is_err());
        assert!(!highlighter.is_initialized());
        assert!(highlighter.initialize().is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn known_language_is_highlighted_per_line() {
        let highlighter = echo_highlighter(Arc::new(AtomicUsize::new(0)));
        highlighter.initialize().expect("initialize");
        let code = highlighter.highlight("a\nb", Some("echo"));
        assert!(code.highlighted);
        assert_eq!(
            code.lines,
            vec!["\x1b[38;2;1;2;3ma\x1b[39m", "\x1b[38;2;1;2;3mb\x1b[39m"]
        );
    }

    #[test]
    fn unknown_or_missing_language_falls_back() {
        let highlighter = echo_highlighter(Arc::new(AtomicUsize::new(0)));
        highlighter.initialize().expect("initialize");
        assert!(!highlighter.highlight("x", Some("cobol")).highlighted);
        assert!(!highlighter.highlight("x", None).highlighted);
        assert!(!highlighter.highlight("x", Some("  ")).highlighted);
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(super::resolve_alias("sh"), "bash");
        assert_eq!(super::resolve_alias("PY"), "python");
        assert_eq!(super::resolve_alias("php"), "php");
    }
}
