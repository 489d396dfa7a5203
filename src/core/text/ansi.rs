//! ANSI escape scanning and SGR/hyperlink state tracking.

pub const RESET: &str = "\x1b[0m";
pub const HYPERLINK_CLOSE: &str = "\x1b]8;;\x07";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeKind {
    Csi,
    Osc,
    /// APC / DCS payloads, terminated like OSC.
    StringControl,
    Ss3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escape<'a> {
    pub code: &'a str,
    pub kind: EscapeKind,
}

/// A run of either one escape sequence or plain text containing no escapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Escape(Escape<'a>),
    Text(&'a str),
}

/// Returns the escape sequence starting at byte `pos`, if any.
///
/// Unterminated sequences are not escapes; their bytes are treated as text.
pub fn escape_at(input: &str, pos: usize) -> Option<Escape<'_>> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    let (end, kind) = match bytes[pos + 1] {
        b'[' => (csi_end(bytes, pos)?, EscapeKind::Csi),
        b']' => (string_end(bytes, pos)?, EscapeKind::Osc),
        b'_' | b'P' => (string_end(bytes, pos)?, EscapeKind::StringControl),
        b'O' if pos + 2 < bytes.len() => (pos + 3, EscapeKind::Ss3),
        _ => return None,
    };
    // SS3 may be followed by a multi-byte char; never cut one in half.
    if !input.is_char_boundary(end) {
        return None;
    }
    Some(Escape {
        code: &input[pos..end],
        kind,
    })
}

fn csi_end(bytes: &[u8], pos: usize) -> Option<usize> {
    bytes[pos + 2..]
        .iter()
        .position(|b| (0x40..=0x7e).contains(b))
        .map(|offset| pos + 2 + offset + 1)
}

fn string_end(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(idx + 1);
        }
        if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            return Some(idx + 2);
        }
        idx += 1;
    }
    None
}

pub fn segments(input: &str) -> Segments<'_> {
    Segments { input, pos: 0 }
}

pub struct Segments<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        if let Some(escape) = escape_at(self.input, self.pos) {
            self.pos += escape.code.len();
            return Some(Segment::Escape(escape));
        }

        let start = self.pos;
        let mut idx = start;
        while idx < self.input.len() {
            if idx > start && escape_at(self.input, idx).is_some() {
                break;
            }
            let ch_len = self.input[idx..].chars().next().map_or(1, char::len_utf8);
            idx += ch_len;
        }
        self.pos = idx;
        Some(Segment::Text(&self.input[start..idx]))
    }
}

pub fn strip_ansi(input: &str) -> String {
    segments(input)
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text),
            Segment::Escape(_) => None,
        })
        .collect()
}

pub fn contains_escape(input: &str) -> bool {
    segments(input).any(|segment| matches!(segment, Segment::Escape(_)))
}

/// Tracks the SGR attributes and open OSC-8 hyperlink in effect after a run of output, so a
/// wrapped or sliced row can reopen exactly what was active where the previous row stopped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StyleState {
    bold: bool,
    dim: bool,
    italic: bool,
    underline: bool,
    inverse: bool,
    strikethrough: bool,
    fg: Option<String>,
    bg: Option<String>,
    hyperlink: Option<String>,
}

impl StyleState {
    /// Folds every escape in `text` into the state.
    pub fn feed(&mut self, text: &str) {
        for segment in segments(text) {
            if let Segment::Escape(escape) = segment {
                self.apply(escape);
            }
        }
    }

    pub fn apply(&mut self, escape: Escape<'_>) {
        match escape.kind {
            EscapeKind::Csi => self.apply_sgr(escape.code),
            EscapeKind::Osc => self.apply_osc(escape.code),
            _ => {}
        }
    }

    fn apply_osc(&mut self, code: &str) {
        let Some(body) = code.strip_prefix("\x1b]8;") else {
            return;
        };
        let body = body
            .strip_suffix('\x07')
            .or_else(|| body.strip_suffix("\x1b\\"))
            .unwrap_or(body);
        let url = body.split_once(';').map_or("", |(_, url)| url);
        self.hyperlink = if url.is_empty() {
            None
        } else {
            Some(code.to_string())
        };
    }

    fn apply_sgr(&mut self, code: &str) {
        let Some(params) = code
            .strip_prefix("\x1b[")
            .and_then(|rest| rest.strip_suffix('m'))
        else {
            return;
        };
        if params.is_empty() {
            self.reset_sgr();
            return;
        }

        let parts: Vec<&str> = params.split(';').collect();
        let mut idx = 0;
        while idx < parts.len() {
            let value = parts[idx].parse::<u16>().unwrap_or(0);
            if value == 38 || value == 48 {
                let span = match parts.get(idx + 1) {
                    Some(&"5") => 3,
                    Some(&"2") => 5,
                    _ => 1,
                };
                if span > 1 && idx + span <= parts.len() {
                    let color = parts[idx..idx + span].join(";");
                    if value == 38 {
                        self.fg = Some(color);
                    } else {
                        self.bg = Some(color);
                    }
                    idx += span;
                    continue;
                }
            }

            match value {
                0 => self.reset_sgr(),
                1 => self.bold = true,
                2 => self.dim = true,
                3 => self.italic = true,
                4 => self.underline = true,
                7 => self.inverse = true,
                9 => self.strikethrough = true,
                21 => self.bold = false,
                22 => {
                    self.bold = false;
                    self.dim = false;
                }
                23 => self.italic = false,
                24 => self.underline = false,
                27 => self.inverse = false,
                29 => self.strikethrough = false,
                39 => self.fg = None,
                49 => self.bg = None,
                30..=37 | 90..=97 => self.fg = Some(value.to_string()),
                40..=47 | 100..=107 => self.bg = Some(value.to_string()),
                _ => {}
            }
            idx += 1;
        }
    }

    fn reset_sgr(&mut self) {
        let hyperlink = self.hyperlink.take();
        *self = Self {
            hyperlink,
            ..Self::default()
        };
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Escapes that re-establish the current state at the start of a new row.
    pub fn reopen(&self) -> String {
        let mut codes: Vec<&str> = Vec::new();
        if self.bold {
            codes.push("1");
        }
        if self.dim {
            codes.push("2");
        }
        if self.italic {
            codes.push("3");
        }
        if self.underline {
            codes.push("4");
        }
        if self.inverse {
            codes.push("7");
        }
        if self.strikethrough {
            codes.push("9");
        }
        if let Some(fg) = self.fg.as_deref() {
            codes.push(fg);
        }
        if let Some(bg) = self.bg.as_deref() {
            codes.push(bg);
        }

        let mut out = String::new();
        if !codes.is_empty() {
            out.push_str(&format!("\x1b[{}m", codes.join(";")));
        }
        if let Some(link) = self.hyperlink.as_deref() {
            out.push_str(link);
        }
        out
    }

    /// Escapes appended to a row that is broken mid-style. Underline and hyperlinks would
    /// otherwise bleed into the padding or the next terminal row.
    pub fn row_end(&self) -> String {
        let mut out = String::new();
        if self.underline {
            out.push_str("\x1b[24m");
        }
        if self.hyperlink.is_some() {
            out.push_str(HYPERLINK_CLOSE);
        }
        out
    }

    /// Escapes that return the terminal to a fully plain state.
    pub fn close_all(&self) -> String {
        let mut out = String::new();
        if self.hyperlink.is_some() {
            out.push_str(HYPERLINK_CLOSE);
        }
        let mut sgr_only = self.clone();
        sgr_only.hyperlink = None;
        if !sgr_only.is_plain() {
            out.push_str(RESET);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{contains_escape, escape_at, segments, strip_ansi, EscapeKind, Segment, StyleState};

    #[test]
    fn csi_and_osc_sequences_are_recognized() {
        let csi = escape_at("\x1b[38;5;81mx", 0).expect("csi");
        assert_eq!(csi.code, "\x1b[38;5;81m");
        assert_eq!(csi.kind, EscapeKind::Csi);

        let osc = escape_at("\x1b]8;;https://a.b\x07x", 0).expect("osc");
        assert_eq!(osc.code, "\x1b]8;;https://a.b\x07");

        let st = escape_at("\x1b]8;;u\x1b\\x", 0).expect("st terminated");
        assert_eq!(st.code, "\x1b]8;;u\x1b\\");
    }

    #[test]
    fn unterminated_escape_is_text() {
        assert!(escape_at("\x1b[12", 0).is_none());
        assert_eq!(strip_ansi("a\x1b[12"), "a\x1b[12");
    }

    #[test]
    fn segments_split_text_and_escapes() {
        let parts: Vec<Segment<'_>> = segments("ab\x1b[1mcd\x1b[22m").collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], Segment::Text("ab"));
        assert_eq!(parts[2], Segment::Text("cd"));
    }

    #[test]
    fn strip_removes_sgr_and_hyperlinks() {
        let input = "\x1b]8;;https://x.y\x07\x1b[4mlink\x1b[24m\x1b]8;;\x07 done";
        assert_eq!(strip_ansi(input), "link done");
        assert!(contains_escape(input));
        assert!(!contains_escape("plain"));
    }

    #[test]
    fn state_reopens_active_attributes() {
        let mut state = StyleState::default();
        state.feed("\x1b[1m\x1b[38;2;1;2;3mhello");
        assert_eq!(state.reopen(), "\x1b[1;38;2;1;2;3m");
        state.feed("\x1b[22m");
        assert_eq!(state.reopen(), "\x1b[38;2;1;2;3m");
        state.feed("\x1b[39m");
        assert!(state.is_plain());
    }

    #[test]
    fn hyperlink_is_tracked_and_closed() {
        let mut state = StyleState::default();
        state.feed("\x1b]8;;https://x.y\x07\x1b[4m");
        assert_eq!(state.row_end(), "\x1b[24m\x1b]8;;\x07");
        assert_eq!(state.close_all(), "\x1b]8;;\x07\x1b[0m");
        state.feed("\x1b[24m\x1b]8;;\x07");
        assert!(state.is_plain());
        assert_eq!(state.close_all(), "");
    }
}
