//! Width-aware wrapping and slicing of ANSI-tagged text.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{segments, strip_ansi, Segment, StyleState};
use super::width::{grapheme_width, visible_width};

/// Word-wraps `text` to `width` visible columns. Embedded newlines always break.
pub fn wrap_text_with_ansi(text: &str, width: usize) -> Vec<String> {
    wrap_with_widths(text, width, width)
}

/// Word-wraps `text` so the first row fits `first_width` columns and every later row fits
/// `rest_width` columns.
///
/// Escape sequences are never split. Styles active at a break are reopened on the next row.
/// Underline and hyperlinks still open where an input line ends are closed on its last row.
/// A single word wider than the row limit is emitted whole on its own row.
pub fn wrap_with_widths(text: &str, first_width: usize, rest_width: usize) -> Vec<String> {
    let first_width = first_width.max(1);
    let rest_width = rest_width.max(1);

    let mut rows = Vec::new();
    let mut state = StyleState::default();
    for input_line in text.split('\n') {
        let mut line = state.reopen();
        line.push_str(input_line);
        let first_row = rows.len();
        wrap_line(&line, first_width, rest_width, &mut rows);
        state.feed(input_line);

        let close = state.row_end();
        if let Some(last) = rows[first_row..].last_mut() {
            if !close.is_empty() {
                *last = format!("{}{close}", last.trim_end());
            }
        }
    }

    rows.into_iter()
        .map(|row| row.trim_end().to_string())
        .collect()
}

fn wrap_line(line: &str, first_width: usize, rest_width: usize, rows: &mut Vec<String>) {
    let limit_for = |rows: &Vec<String>| {
        if rows.is_empty() {
            first_width
        } else {
            rest_width
        }
    };

    if visible_width(line) <= limit_for(rows) {
        rows.push(line.to_string());
        return;
    }

    let mut state = StyleState::default();
    let mut current = String::new();
    let mut current_width = 0;

    for token in split_tokens(line) {
        let token_width = visible_width(&token);
        let is_space = strip_ansi(&token).trim().is_empty();
        let limit = limit_for(rows);

        if current_width > 0 && current_width + token_width > limit {
            let mut row = current.trim_end().to_string();
            if is_space {
                // The dropped space may carry the closing escape of the word before it.
                row.push_str(&escapes_of(&token));
                state.feed(&token);
            }
            row.push_str(&state.row_end());
            rows.push(row);

            current = state.reopen();
            current_width = 0;
            if !is_space {
                current.push_str(&token);
                current_width = token_width;
                state.feed(&token);
            }
            continue;
        }

        current.push_str(&token);
        current_width += token_width;
        state.feed(&token);
    }

    if !current.is_empty() {
        rows.push(current);
    }
}

fn escapes_of(token: &str) -> String {
    segments(token)
        .filter_map(|segment| match segment {
            Segment::Escape(escape) => Some(escape.code),
            Segment::Text(_) => None,
        })
        .collect()
}

/// Splits a line into alternating word and space runs. Escapes stick to the text after them.
fn split_tokens(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut pending = String::new();
    let mut in_space = false;

    for segment in segments(line) {
        match segment {
            Segment::Escape(escape) => pending.push_str(escape.code),
            Segment::Text(text) => {
                for ch in text.chars() {
                    let is_space = ch == ' ';
                    if is_space != in_space && !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    current.push_str(&pending);
                    pending.clear();
                    in_space = is_space;
                    current.push(ch);
                }
            }
        }
    }

    current.push_str(&pending);
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Cuts `text` into consecutive rows of at most `width` visible columns, grapheme by
/// grapheme. A grapheme that would straddle the limit starts the next row, so a row may end
/// up narrower than `width`. Every row is self-contained: active styles are reopened at its
/// start and closed at its end.
pub fn hard_break(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    if visible_width(text) <= width {
        return vec![text.to_string()];
    }

    let mut rows = Vec::new();
    let mut state = StyleState::default();
    let mut current = String::new();
    let mut current_width = 0;

    for segment in segments(text) {
        match segment {
            Segment::Escape(escape) => {
                current.push_str(escape.code);
                state.apply(escape);
            }
            Segment::Text(chunk) => {
                for grapheme in chunk.graphemes(true) {
                    let grapheme_cols = grapheme_width(grapheme);
                    if current_width > 0 && current_width + grapheme_cols > width {
                        current.push_str(&state.close_all());
                        rows.push(std::mem::take(&mut current));
                        current = state.reopen();
                        current_width = 0;
                    }
                    current.push_str(grapheme);
                    current_width += grapheme_cols;
                }
            }
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::{hard_break, wrap_text_with_ansi, wrap_with_widths};
    use crate::core::text::ansi::{strip_ansi, StyleState};
    use crate::core::text::width::visible_width;
    use pretty_assertions::assert_eq;

    #[test]
    fn word_wrap_splits_on_spaces() {
        assert_eq!(wrap_text_with_ansi("word word", 4), vec!["word", "word"]);
    }

    #[test]
    fn no_leading_whitespace_on_wrap() {
        let wrapped = wrap_text_with_ansi("word  word", 4);
        assert_eq!(wrapped.len(), 2);
        assert!(!wrapped[1].starts_with(' '));
    }

    #[test]
    fn long_words_are_kept_whole() {
        let wrapped = wrap_text_with_ansi("a supercalifragilistic b", 8);
        assert_eq!(wrapped, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn styles_reopen_after_break() {
        let wrapped = wrap_text_with_ansi("\x1b[31mword word\x1b[39m", 4);
        assert_eq!(wrapped.len(), 2);
        assert!(wrapped[0].starts_with("\x1b[31m"));
        assert!(wrapped[1].starts_with("\x1b[31m"));
    }

    #[test]
    fn underline_closed_at_row_end() {
        let wrapped = wrap_text_with_ansi("\x1b[4mword word\x1b[24m", 4);
        assert!(wrapped[0].ends_with("\x1b[24m"));
        assert!(wrapped[1].starts_with("\x1b[4m"));
        assert_eq!(wrapped[1].matches("\x1b[24m").count(), 1);
    }

    #[test]
    fn underline_closed_before_hard_newline() {
        let wrapped = wrap_text_with_ansi("\x1b[4mfirst\nsecond\x1b[24m", 40);
        assert_eq!(wrapped, vec!["\x1b[4mfirst\x1b[24m", "\x1b[4msecond\x1b[24m"]);
    }

    #[test]
    fn close_carried_by_dropped_space_stays_on_its_row() {
        let wrapped = wrap_text_with_ansi("aaaa \x1b[1mbbbb\x1b[22m cccc", 9);
        assert_eq!(wrapped, vec!["aaaa \x1b[1mbbbb\x1b[22m", "cccc"]);
    }

    #[test]
    fn rows_leave_nothing_open_that_the_next_row_does_not_reopen() {
        let text = "aa \x1b[1mbb\x1b[22m \x1b[3mcc dd\x1b[23m \x1b[4mee\x1b[24m ff \x1b[1mgg\x1b[22m hh";
        for width in 2..12 {
            let rows = wrap_text_with_ansi(text, width);
            for pair in rows.windows(2) {
                let mut carried = StyleState::default();
                carried.feed(&pair[0]);
                assert!(
                    carried.is_plain() || pair[1].starts_with(&carried.reopen()),
                    "{:?} leaks into {:?} at width {width}",
                    pair[0],
                    pair[1]
                );
            }
            assert_eq!(
                rows.iter().map(|row| strip_ansi(row)).collect::<Vec<_>>().join(" "),
                "aa bb cc dd ee ff gg hh"
            );
        }
    }

    #[test]
    fn first_and_rest_widths_differ() {
        let wrapped = wrap_with_widths("aa bb cc dd", 2, 5);
        assert_eq!(wrapped, vec!["aa", "bb cc", "dd"]);
    }

    #[test]
    fn newlines_force_breaks() {
        assert_eq!(wrap_text_with_ansi("a\nb", 80), vec!["a", "b"]);
        assert_eq!(wrap_text_with_ansi("", 80), vec![""]);
    }

    #[test]
    fn hard_break_slices_by_columns() {
        let rows = hard_break("abcdefgh", 3);
        assert_eq!(rows, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn hard_break_never_splits_wide_graphemes() {
        let rows = hard_break("ab日本", 3);
        assert_eq!(strip_ansi(&rows[0]), "ab");
        assert_eq!(strip_ansi(&rows[1]), "日");
        assert_eq!(strip_ansi(&rows[2]), "本");
        assert!(rows.iter().all(|row| visible_width(row) <= 3));
    }

    #[test]
    fn hard_break_rows_are_self_contained() {
        let rows = hard_break("\x1b[31mabcdef\x1b[39m", 3);
        assert_eq!(rows[0], "\x1b[31mabc\x1b[0m");
        assert!(rows[1].starts_with("\x1b[31m"));
    }
}
