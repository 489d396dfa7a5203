//! Line-oriented fallback renderer.
//!
//! Used when the full pipeline cannot run. It has no parser, no highlighter and no box drawing,
//! so it cannot fail; it only recognizes fences, `#` headings, list items and `>` quotes line by
//! line and wraps everything else.

use super::layout;
use crate::core::text::width::visible_width;
use crate::theme::Theme;

const CODE_INDENT: &str = "    ";

pub fn render_legacy(markdown: &str, width: usize, theme: &Theme) -> String {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut in_fence = false;

    for line in markdown.replace("\r\n", "\n").split('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            lines.push(format!("{CODE_INDENT}{}", (theme.code_block)(line)));
            continue;
        }
        if trimmed.is_empty() {
            lines.push(String::new());
            continue;
        }

        if let Some(heading) = heading_text(trimmed) {
            lines.extend(
                layout::wrap(heading, width, "", None)
                    .iter()
                    .map(|row| (theme.strong)(row)),
            );
        } else if let Some((marker, text)) = list_item(trimmed) {
            let indent = &line[..line.len() - trimmed.len()];
            let first = format!("{indent}{marker} ");
            let hanging = " ".repeat(visible_width(&first));
            lines.extend(layout::wrap(text, width, &first, Some(&hanging)));
        } else if let Some(quote) = trimmed.strip_prefix('>') {
            lines.extend(
                layout::wrap(quote.trim_start(), width, "> ", None)
                    .iter()
                    .map(|row| (theme.blockquote)(row)),
            );
        } else {
            lines.extend(layout::wrap(line, width, "", None));
        }
    }

    lines.join("\n")
}

fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(' ').map(str::trim)
}

fn list_item(line: &str) -> Option<(&str, &str)> {
    for bullet in ["- ", "* ", "+ "] {
        if let Some(text) = line.strip_prefix(bullet) {
            return Some((&line[..1], text));
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let rest = &line[digits..];
    let text = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))?;
    Some((&line[..digits + 1], text))
}

#[cfg(test)]
mod tests {
    use super::render_legacy;
    use crate::theme::Theme;
    use pretty_assertions::assert_eq;

    #[test]
    fn fences_indent_code_verbatim() {
        let out = render_legacy("```rust\nfn main() {}\n```", 40, &Theme::plain());
        assert_eq!(out, "    fn main() {}");
    }

    #[test]
    fn list_items_keep_hanging_indent() {
        let out = render_legacy("1. alpha beta gamma delta", 14, &Theme::plain());
        assert_eq!(out, "1. alpha beta\n   gamma delta");
    }

    #[test]
    fn headings_and_quotes() {
        let out = render_legacy("## Title\n\n> quoted", 40, &Theme::dark());
        assert_eq!(out, "\x1b[1mTitle\x1b[22m\n\n\x1b[3m\x1b[38;5;246m> quoted\x1b[39m\x1b[23m");
    }

    #[test]
    fn paragraphs_wrap() {
        let out = render_legacy("alpha beta gamma", 11, &Theme::plain());
        assert_eq!(out, "alpha beta\ngamma");
    }
}
