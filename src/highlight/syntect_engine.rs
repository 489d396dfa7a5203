//! `syntect`-backed grammar engine using the bundled syntax and theme dumps (no network).

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::token::{RawToken, FONT_BOLD, FONT_ITALIC, FONT_UNDERLINE};
use super::GrammarEngine;
use crate::error::{HighlightError, RenderError};

pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

pub struct SyntectEngine {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl SyntectEngine {
    /// Loads grammars and themes, failing when `theme` is not among the bundled themes.
    pub fn load(theme: &str) -> Result<Self, RenderError> {
        let themes = ThemeSet::load_defaults();
        if !themes.themes.contains_key(theme) {
            let mut available: Vec<&str> = themes.themes.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(RenderError::Initialization {
                resource: "syntax theme",
                reason: format!("unknown theme `{theme}` (available: {})", available.join(", ")),
            });
        }

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes,
        })
    }
}

impl GrammarEngine for SyntectEngine {
    fn tokenize(
        &self,
        code: &str,
        language: &str,
        theme: &str,
    ) -> Result<Vec<Vec<RawToken>>, HighlightError> {
        let syntax = self
            .syntaxes
            .find_syntax_by_token(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;
        let theme = self
            .themes
            .themes
            .get(theme)
            .ok_or_else(|| HighlightError::Grammar(format!("theme `{theme}` is not loaded")))?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let ranges = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(|err| HighlightError::Grammar(err.to_string()))?;
            lines.push(
                ranges
                    .into_iter()
                    .filter_map(|(style, text)| raw_token(style, text))
                    .collect(),
            );
        }
        // `LinesWithEndings` yields nothing for "" and no trailing empty line for "a\n".
        if code.is_empty() || code.ends_with('\n') {
            lines.push(Vec::new());
        }
        Ok(lines)
    }
}

fn raw_token(style: Style, text: &str) -> Option<RawToken> {
    let content = text.trim_end_matches(['\n', '\r']);
    if content.is_empty() {
        return None;
    }

    let fg = style.foreground;
    let mut font_style = 0;
    if style.font_style.contains(FontStyle::ITALIC) {
        font_style |= FONT_ITALIC;
    }
    if style.font_style.contains(FontStyle::BOLD) {
        font_style |= FONT_BOLD;
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        font_style |= FONT_UNDERLINE;
    }

    Some(RawToken {
        color: Some(format!("#{:02x}{:02x}{:02x}", fg.r, fg.g, fg.b)),
        font_style: Some(font_style),
        ..RawToken::new(content)
    })
}
