//! Padding and truncation helpers.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{segments, Segment, StyleState};
use super::width::{grapheme_width, visible_width};

/// Right-pads `text` with spaces to exactly `width` columns. Wider text is returned as is.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(visible_width(text));
    let mut out = String::with_capacity(text.len() + padding);
    out.push_str(text);
    out.push_str(&" ".repeat(padding));
    out
}

/// Pads `text` to `width` columns, placing it left, right, or centered.
pub fn align_to_width(text: &str, width: usize, align: Align) -> String {
    let padding = width.saturating_sub(visible_width(text));
    let (left, right) = match align {
        Align::Left => (0, padding),
        Align::Right => (padding, 0),
        Align::Center => (padding / 2, padding - padding / 2),
    };
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// Shortens `text` to at most `max_width` columns, ending with `ellipsis` when anything was
/// cut. Styles open at the cut are closed before the ellipsis.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str) -> String {
    if max_width == 0 {
        return String::new();
    }
    if visible_width(text) <= max_width {
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    if ellipsis_width >= max_width {
        return ellipsis.chars().take(max_width).collect();
    }
    let target = max_width - ellipsis_width;

    let mut out = String::new();
    let mut state = StyleState::default();
    let mut width = 0;
    'outer: for segment in segments(text) {
        match segment {
            Segment::Escape(escape) => {
                out.push_str(escape.code);
                state.apply(escape);
            }
            Segment::Text(chunk) => {
                for grapheme in chunk.graphemes(true) {
                    let cols = grapheme_width(grapheme);
                    if width + cols > target {
                        break 'outer;
                    }
                    out.push_str(grapheme);
                    width += cols;
                }
            }
        }
    }

    out.push_str(&state.close_all());
    out.push_str(ellipsis);
    out
}

#[cfg(test)]
mod tests {
    use super::{align_to_width, pad_to_width, truncate_to_width, Align};
    use crate::core::text::width::visible_width;

    #[test]
    fn pad_counts_visible_columns() {
        let padded = pad_to_width("\x1b[1mhi\x1b[22m", 4);
        assert_eq!(padded, "\x1b[1mhi\x1b[22m  ");
        assert_eq!(visible_width(&padded), 4);
        assert_eq!(pad_to_width("toolong", 3), "toolong");
    }

    #[test]
    fn alignment_distributes_padding() {
        assert_eq!(align_to_width("ab", 6, Align::Right), "    ab");
        assert_eq!(align_to_width("ab", 5, Align::Center), " ab  ");
    }

    #[test]
    fn truncate_returns_original_when_short() {
        assert_eq!(truncate_to_width("hello", 6, "…"), "hello");
    }

    #[test]
    fn truncate_closes_styles_before_ellipsis() {
        let truncated = truncate_to_width("\x1b[31mhello", 4, "…");
        assert_eq!(truncated, "\x1b[31mhel\x1b[0m…");
        assert_eq!(visible_width(&truncated), 4);
    }

    #[test]
    fn truncate_with_tiny_width() {
        assert_eq!(truncate_to_width("hello", 2, "..."), "..");
    }
}
