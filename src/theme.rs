//! Markdown themes: named style functions selected once per render call.
//!
//! Every style function wraps its input in a style-on escape and the matching style-off
//! escape (`22`, `23`, `24`, `29`, `39`) instead of a full reset, so a styled span nested
//! inside another never clears its parent's attributes for the text that follows it.

pub type StyleFn = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct Theme {
    pub id: String,
    pub text: StyleFn,
    pub strong: StyleFn,
    pub emphasis: StyleFn,
    pub strikethrough: StyleFn,
    /// Rule drawn under depth 1 and 2 headings.
    pub underline: StyleFn,
    pub code: StyleFn,
    /// Uncolored pass-through for code the highlighter could not color.
    pub code_block: StyleFn,
    pub code_block_border: StyleFn,
    pub code_label: StyleFn,
    pub heading1: StyleFn,
    pub heading2: StyleFn,
    pub heading3: StyleFn,
    pub heading4: StyleFn,
    pub list_bullet: StyleFn,
    pub list_number: StyleFn,
    pub link: StyleFn,
    pub link_url: StyleFn,
    pub blockquote: StyleFn,
    pub hr: StyleFn,
    pub table_border: StyleFn,
    pub bullet: String,
}

impl std::fmt::Debug for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Theme")
            .field("id", &self.id)
            .field("bullet", &self.bullet)
            .finish_non_exhaustive()
    }
}

pub const DARK: &str = "dark";
pub const LIGHT: &str = "light";
pub const PLAIN: &str = "plain";

impl Theme {
    pub fn builtin_ids() -> &'static [&'static str] {
        &[DARK, LIGHT, PLAIN]
    }

    pub fn by_id(id: &str) -> Option<Theme> {
        match id {
            DARK => Some(Self::dark()),
            LIGHT => Some(Self::light()),
            PLAIN => Some(Self::plain()),
            _ => None,
        }
    }

    pub fn dark() -> Self {
        Self {
            id: DARK.to_string(),
            text: identity(),
            strong: sgr("1", "22"),
            emphasis: sgr("3", "23"),
            strikethrough: sgr("9", "29"),
            underline: sgr("38;5;67", "39"),
            code: sgr("38;5;215", "39"),
            code_block: sgr("38;5;252", "39"),
            code_block_border: sgr("38;5;240", "39"),
            code_label: compose(sgr("1", "22"), sgr("38;5;109", "39")),
            heading1: compose(sgr("1", "22"), sgr("38;5;117", "39")),
            heading2: compose(sgr("1", "22"), sgr("38;5;111", "39")),
            heading3: compose(sgr("1", "22"), sgr("38;5;153", "39")),
            heading4: sgr("1", "22"),
            list_bullet: sgr("38;5;81", "39"),
            list_number: sgr("38;5;81", "39"),
            link: compose(sgr("4", "24"), sgr("38;5;75", "39")),
            link_url: sgr("38;5;244", "39"),
            blockquote: compose(sgr("3", "23"), sgr("38;5;246", "39")),
            hr: sgr("38;5;240", "39"),
            table_border: sgr("38;5;240", "39"),
            bullet: "•".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            id: LIGHT.to_string(),
            text: identity(),
            strong: sgr("1", "22"),
            emphasis: sgr("3", "23"),
            strikethrough: sgr("9", "29"),
            underline: sgr("38;5;67", "39"),
            code: sgr("38;5;130", "39"),
            code_block: sgr("38;5;236", "39"),
            code_block_border: sgr("38;5;248", "39"),
            code_label: compose(sgr("1", "22"), sgr("38;5;30", "39")),
            heading1: compose(sgr("1", "22"), sgr("38;5;25", "39")),
            heading2: compose(sgr("1", "22"), sgr("38;5;26", "39")),
            heading3: compose(sgr("1", "22"), sgr("38;5;24", "39")),
            heading4: sgr("1", "22"),
            list_bullet: sgr("38;5;31", "39"),
            list_number: sgr("38;5;31", "39"),
            link: compose(sgr("4", "24"), sgr("38;5;26", "39")),
            link_url: sgr("38;5;243", "39"),
            blockquote: compose(sgr("3", "23"), sgr("38;5;242", "39")),
            hr: sgr("38;5;248", "39"),
            table_border: sgr("38;5;248", "39"),
            bullet: "•".to_string(),
        }
    }

    /// No escapes at all; useful for logs, pipes, and golden tests.
    pub fn plain() -> Self {
        Self {
            id: PLAIN.to_string(),
            text: identity(),
            strong: identity(),
            emphasis: identity(),
            strikethrough: identity(),
            underline: identity(),
            code: identity(),
            code_block: identity(),
            code_block_border: identity(),
            code_label: identity(),
            heading1: identity(),
            heading2: identity(),
            heading3: identity(),
            heading4: identity(),
            list_bullet: identity(),
            list_number: identity(),
            link: identity(),
            link_url: identity(),
            blockquote: identity(),
            hr: identity(),
            table_border: identity(),
            bullet: "-".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Wraps non-empty text in `ESC[{on}m … ESC[{off}m`.
pub fn sgr(on: &'static str, off: &'static str) -> StyleFn {
    Box::new(move |text| {
        if text.is_empty() {
            return String::new();
        }
        format!("\x1b[{on}m{text}\x1b[{off}m")
    })
}

pub fn identity() -> StyleFn {
    Box::new(|text| text.to_string())
}

/// `outer(inner(text))`.
pub fn compose(outer: StyleFn, inner: StyleFn) -> StyleFn {
    Box::new(move |text| outer(&inner(text)))
}

/// The escapes a style function emits before its content. Re-emitting them after a nested
/// span restores the enclosing style for the text that follows the span.
pub fn style_prefix(style: &dyn Fn(&str) -> String) -> String {
    const SENTINEL: char = '\u{0}';
    let styled = style("\u{0}");
    styled
        .find(SENTINEL)
        .map(|idx| styled[..idx].to_string())
        .unwrap_or_default()
}
