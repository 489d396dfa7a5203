//! Display width of graphemes and ANSI-tagged strings.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::{segments, Segment};

pub const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    // RGI emoji render double-width even when built from narrow code points.
    if emoji_get(grapheme).is_some() {
        return 2;
    }

    grapheme
        .chars()
        .map(|ch| match ch {
            '\t' => TAB_WIDTH,
            _ => UnicodeWidthChar::width(ch).unwrap_or(0),
        })
        .sum()
}

/// Columns `input` occupies on screen, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    segments(input)
        .map(|segment| match segment {
            Segment::Text(text) => text.graphemes(true).map(grapheme_width).sum(),
            Segment::Escape(_) => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{grapheme_width, visible_width};

    #[test]
    fn escapes_do_not_count() {
        assert_eq!(visible_width("hi\x1b[31m!!\x1b[0m"), 4);
        assert_eq!(
            visible_width("\x1b]8;;https://example.com\x07link\x1b]8;;\x07"),
            4
        );
    }

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(visible_width("日本"), 4);
        assert_eq!(visible_width("😀"), 2);
        assert_eq!(grapheme_width("e\u{301}"), 1);
    }

    #[test]
    fn tabs_use_fixed_width() {
        assert_eq!(visible_width("a\tb"), 5);
    }
}
