//! Block layout: indented wrapping and bordered code boxes.

use crate::core::text::ansi::{contains_escape, RESET};
use crate::core::text::slice::{hard_break, wrap_text_with_ansi, wrap_with_widths};
use crate::core::text::utils::{pad_to_width, truncate_to_width};
use crate::core::text::width::visible_width;

pub const MIN_BOX_WIDTH: usize = 40;

/// Wraps `text` to `width` total columns. The first row starts with `indent`, later rows with
/// `hanging_indent` (defaults to `indent`); each row's text budget is `width` minus its prefix.
pub fn wrap(text: &str, width: usize, indent: &str, hanging_indent: Option<&str>) -> Vec<String> {
    let hanging = hanging_indent.unwrap_or(indent);
    let first = width.saturating_sub(visible_width(indent));
    let rest = width.saturating_sub(visible_width(hanging));

    wrap_with_widths(text, first, rest)
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let prefix = if idx == 0 { indent } else { hanging };
            if row.is_empty() {
                prefix.trim_end().to_string()
            } else {
                format!("{prefix}{row}")
            }
        })
        .collect()
}

/// `max(40, min(terminal_width, width))`; an unknown terminal width does not constrain.
pub fn box_width(width: usize, terminal_width: Option<usize>) -> usize {
    terminal_width
        .map_or(width, |columns| columns.min(width))
        .max(MIN_BOX_WIDTH)
}

/// Styling hooks for the box frame.
pub struct BoxChrome<'a> {
    pub border: &'a dyn Fn(&str) -> String,
    pub label: &'a dyn Fn(&str) -> String,
}

impl BoxChrome<'_> {
    pub fn unstyled() -> BoxChrome<'static> {
        fn same(text: &str) -> String {
            text.to_string()
        }
        BoxChrome {
            border: &same,
            label: &same,
        }
    }
}

/// Frames already-highlighted code lines in a box exactly `box_width(width, terminal_width)`
/// columns wide:
///
/// ```text
/// ┌─ rust ───────┐
/// │ fn main() {} │
/// └──────────────┘
/// ```
///
/// Lines are word-wrapped to the inner width; anything still too wide is sliced by visible
/// columns into further rows. Every row is padded to the inner width.
pub fn box_code(
    lines: &[String],
    width: usize,
    language: &str,
    terminal_width: Option<usize>,
    chrome: &BoxChrome<'_>,
) -> Vec<String> {
    let box_width = box_width(width, terminal_width);
    let inner = box_width - 4;
    let dashes = box_width - 2;

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(top_border(language.trim(), dashes, inner, chrome));

    let left = format!("{} ", (chrome.border)("│"));
    let right = format!(" {}", (chrome.border)("│"));
    for line in lines {
        let line = line.replace('\t', "   ");
        for wrapped in wrap_text_with_ansi(&line, inner) {
            for row in hard_break(&wrapped, inner) {
                let mut content = row;
                if contains_escape(&content) {
                    content.push_str(RESET);
                }
                out.push(format!("{left}{}{right}", pad_to_width(&content, inner)));
            }
        }
    }

    out.push((chrome.border)(&format!("└{}┘", "─".repeat(dashes))));
    out
}

fn top_border(language: &str, dashes: usize, inner: usize, chrome: &BoxChrome<'_>) -> String {
    if language.is_empty() {
        return (chrome.border)(&format!("┌{}┐", "─".repeat(dashes)));
    }

    let label = truncate_to_width(&format!(" {language} "), inner, "… ");
    let label_width = visible_width(&label);
    format!(
        "{}{}{}",
        (chrome.border)("┌─"),
        (chrome.label)(&label),
        (chrome.border)(&format!("{}┐", "─".repeat(dashes - 1 - label_width)))
    )
}
